//! Viewer configuration parsed from environment variables.

use std::time::Duration;

use crate::consts::{
    DEFAULT_RENDER_TIMEOUT_SECS, DISMISS_KEY, FULLSCREEN_MAX_SCALE, INLINE_MAX_SCALE, MIN_SCALE, WHEEL_MIN_SCALE,
};
use crate::engine::EngineConfig;
use crate::input::Key;

/// Errors produced while reading viewer configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment value could not be parsed.
    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },

    /// The ceiling is below the surface's highest floor, or not finite.
    #[error("invalid zoom ceiling {max}: must be finite and at least {min}")]
    InvalidBounds { min: f64, max: f64 },
}

/// Zoom limits for one display surface.
///
/// Buttons and wheel share `max_scale`; they differ only in their floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceBounds {
    pub min_scale: f64,
    pub max_scale: f64,
    pub wheel_min_scale: f64,
}

impl SurfaceBounds {
    #[must_use]
    pub fn inline() -> Self {
        Self { min_scale: MIN_SCALE, max_scale: INLINE_MAX_SCALE, wheel_min_scale: WHEEL_MIN_SCALE }
    }

    #[must_use]
    pub fn fullscreen() -> Self {
        Self { min_scale: MIN_SCALE, max_scale: FULLSCREEN_MAX_SCALE, wheel_min_scale: WHEEL_MIN_SCALE }
    }

    /// Same bounds with a different ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBounds`] when the ceiling is below the
    /// wheel floor or not finite.
    pub fn with_max_scale(self, max_scale: f64) -> Result<Self, ConfigError> {
        let floor = self.wheel_min_scale.max(self.min_scale);
        if !max_scale.is_finite() || max_scale < floor {
            return Err(ConfigError::InvalidBounds { min: floor, max: max_scale });
        }
        Ok(Self { max_scale, ..self })
    }

    /// Whether `scale` lies within `[min_scale, max_scale]`.
    #[must_use]
    pub fn contains(&self, scale: f64) -> bool {
        (self.min_scale..=self.max_scale).contains(&scale)
    }
}

/// Complete viewer configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub inline: SurfaceBounds,
    pub fullscreen: SurfaceBounds,
    /// Bound on a pending render; `None` waits indefinitely.
    pub render_timeout: Option<Duration>,
    pub dismiss_key: Key,
    /// Whether the fullscreen affordance is offered at all.
    pub fullscreen_enabled: bool,
    pub engine: EngineConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            inline: SurfaceBounds::inline(),
            fullscreen: SurfaceBounds::fullscreen(),
            render_timeout: Some(Duration::from_secs(DEFAULT_RENDER_TIMEOUT_SECS)),
            dismiss_key: Key::new(DISMISS_KEY),
            fullscreen_enabled: true,
            engine: EngineConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Build viewer config from environment variables.
    ///
    /// Optional:
    /// - `DOCVIEW_INLINE_MAX_SCALE`: inline zoom ceiling, default 10
    /// - `DOCVIEW_FULLSCREEN_MAX_SCALE`: fullscreen zoom ceiling, default 10
    /// - `DOCVIEW_RENDER_TIMEOUT_SECS`: default 10; `0` disables the timeout
    /// - `DOCVIEW_THEME`: engine theme, default `neutral`
    /// - `DOCVIEW_FULLSCREEN`: `true` (default) or `false`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(max) = env_parse::<f64>("DOCVIEW_INLINE_MAX_SCALE")? {
            config.inline = config.inline.with_max_scale(max)?;
        }
        if let Some(max) = env_parse::<f64>("DOCVIEW_FULLSCREEN_MAX_SCALE")? {
            config.fullscreen = config.fullscreen.with_max_scale(max)?;
        }
        if let Some(secs) = env_parse::<u64>("DOCVIEW_RENDER_TIMEOUT_SECS")? {
            config.render_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Ok(theme) = std::env::var("DOCVIEW_THEME") {
            config.engine.theme = theme;
        }
        if let Some(enabled) = env_parse::<bool>("DOCVIEW_FULLSCREEN")? {
            config.fullscreen_enabled = enabled;
        }

        Ok(config)
    }
}

fn env_parse<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
