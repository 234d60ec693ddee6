//! Wildcard matching for actor type classification.
//!
//! Traffic-actor lookups classify actors by matching their type ID
//! against patterns like `*traffic.*` (any sign or light) and
//! `*traffic_light*` (lights only). Matching is case-sensitive and
//! anchored to the full string; `*` matches any run of characters
//! (including none) and `?` matches exactly one.

/// Returns true if `text` matches `pattern` in full.
///
/// Supported metacharacters: `*` (any run, possibly empty) and `?`
/// (exactly one character). Everything else matches literally.
///
/// # Examples
///
/// ```
/// use epilink_core::pattern::wildcard_match;
///
/// assert!(wildcard_match("*traffic.*", "traffic.stop_sign"));
/// assert!(wildcard_match("*traffic_light*", "traffic_light.generic"));
/// assert!(!wildcard_match("*traffic_light*", "traffic.stop_sign"));
/// ```
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let p = pattern.as_bytes();
    let t = text.as_bytes();
    let mut pi = 0;
    let mut ti = 0;
    // Most recent `*` and the text position it is currently consuming up to.
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == b'?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == b'*' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((star_pi, star_ti)) = star {
            // Backtrack: let the last `*` absorb one more character.
            pi = star_pi + 1;
            ti = star_ti + 1;
            star = Some((star_pi, star_ti + 1));
        } else {
            return false;
        }
    }

    // Only trailing stars may remain unconsumed.
    while pi < p.len() && p[pi] == b'*' {
        pi += 1;
    }
    pi == p.len()
}
