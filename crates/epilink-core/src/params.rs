//! Weather and episode settings value types.
//!
//! The concrete encoding of these parameters belongs to the server; the
//! client treats them as plain values to get and set.

/// Environmental weather parameters.
///
/// All intensity fields are percentages in `0.0..=100.0`; angles are
/// degrees. `Default` is an overcast neutral; the named presets cover
/// the common test conditions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeatherParameters {
    /// Cloud cover percentage.
    pub cloudiness: f32,
    /// Rain intensity percentage.
    pub precipitation: f32,
    /// Standing-water percentage.
    pub precipitation_deposits: f32,
    /// Wind intensity percentage.
    pub wind_intensity: f32,
    /// Sun azimuth angle in degrees.
    pub sun_azimuth_angle: f32,
    /// Sun altitude angle in degrees; negative is night.
    pub sun_altitude_angle: f32,
    /// Fog density percentage.
    pub fog_density: f32,
    /// Fog start distance in meters.
    pub fog_distance: f32,
    /// Surface wetness percentage.
    pub wetness: f32,
}

impl WeatherParameters {
    /// Clear sky, sun overhead.
    pub const CLEAR_NOON: WeatherParameters = WeatherParameters {
        cloudiness: 15.0,
        precipitation: 0.0,
        precipitation_deposits: 0.0,
        wind_intensity: 0.35,
        sun_azimuth_angle: 0.0,
        sun_altitude_angle: 75.0,
        fog_density: 0.0,
        fog_distance: 0.0,
        wetness: 0.0,
    };

    /// Heavy rain, sun overhead.
    pub const HARD_RAIN_NOON: WeatherParameters = WeatherParameters {
        cloudiness: 90.0,
        precipitation: 80.0,
        precipitation_deposits: 90.0,
        wind_intensity: 1.0,
        sun_azimuth_angle: 0.0,
        sun_altitude_angle: 75.0,
        fog_density: 7.0,
        fog_distance: 0.75,
        wetness: 0.0,
    };
}

impl Default for WeatherParameters {
    fn default() -> Self {
        Self {
            cloudiness: 50.0,
            precipitation: 0.0,
            precipitation_deposits: 0.0,
            wind_intensity: 0.0,
            sun_azimuth_angle: 0.0,
            sun_altitude_angle: 45.0,
            fog_density: 0.0,
            fog_distance: 0.0,
            wetness: 0.0,
        }
    }
}

/// Episode-wide simulation settings.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EpisodeSettings {
    /// When true, the server only advances on an explicit tick request.
    pub synchronous_mode: bool,
    /// When true, the server skips rendering entirely.
    pub no_rendering_mode: bool,
    /// Fixed simulation step in seconds; `None` means variable step.
    pub fixed_delta_seconds: Option<f64>,
}

impl EpisodeSettings {
    /// Settings for a lockstep client: synchronous mode with a fixed
    /// step of `delta_seconds`.
    pub fn synchronous(delta_seconds: f64) -> Self {
        Self {
            synchronous_mode: true,
            no_rendering_mode: false,
            fixed_delta_seconds: Some(delta_seconds),
        }
    }
}
