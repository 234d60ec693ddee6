//! Lazy list over a bulk actor listing.

use std::sync::{Arc, OnceLock};

use epilink_core::{ActorDescription, ActorId, IndexOutOfRange};

use crate::actor::Actor;
use crate::handle::EpisodeHandle;

/// A fixed listing of actors with lazily built proxies.
///
/// The listing is captured once, at the moment of the query that
/// produced it; the view never refreshes. [`Actor`] proxies are
/// materialized on first access and cached, so repeated access to the
/// same index returns a proxy for the same remote actor without extra
/// work. Destroyed actors stay listed — liveness is answered by
/// [`Actor::is_alive`], not by the view.
pub struct ActorView {
    handle: EpisodeHandle,
    descriptions: Vec<Arc<ActorDescription>>,
    proxies: Vec<OnceLock<Actor>>,
}

impl ActorView {
    pub(crate) fn new(handle: EpisodeHandle, descriptions: Vec<ActorDescription>) -> Self {
        let descriptions: Vec<_> = descriptions.into_iter().map(Arc::new).collect();
        let proxies = (0..descriptions.len()).map(|_| OnceLock::new()).collect();
        Self {
            handle,
            descriptions,
            proxies,
        }
    }

    /// Number of actors in the listing.
    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    /// Whether the listing is empty.
    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }

    /// The actor at `index` in listing order.
    pub fn get(&self, index: usize) -> Result<Actor, IndexOutOfRange> {
        if index >= self.descriptions.len() {
            return Err(IndexOutOfRange {
                index,
                len: self.descriptions.len(),
            });
        }
        Ok(self.materialize(index).clone())
    }

    /// The listed actor with `id`, if the listing contains it.
    pub fn find(&self, id: ActorId) -> Option<Actor> {
        self.descriptions
            .iter()
            .position(|d| d.id == id)
            .map(|index| self.materialize(index).clone())
    }

    /// Iterate the listing in order, materializing proxies as needed.
    pub fn iter(&self) -> impl Iterator<Item = Actor> + '_ {
        (0..self.len()).map(|index| self.materialize(index).clone())
    }

    fn materialize(&self, index: usize) -> &Actor {
        self.proxies[index].get_or_init(|| {
            Actor::new(
                Arc::clone(&self.descriptions[index]),
                self.handle.clone(),
            )
        })
    }
}

impl std::fmt::Debug for ActorView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorView")
            .field("len", &self.len())
            .finish()
    }
}
