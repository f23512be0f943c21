//! Viewer configuration, read once at startup and passed down explicitly.

use std::env;
use std::fmt;
use std::str::FromStr;

use data::protocol::SEARCH_LIMIT;
use data::search::SEARCH_DEBOUNCE_MS;
use foundation::geo::LngLat;
use interaction::camera::{FOCUS_DURATION_MS, FOCUS_ZOOM};

pub const DEFAULT_STYLE_URL: &str = "mapbox://styles/mapbox/dark-v11";

/// Hawaii, the region the map opens on.
pub const DEFAULT_CENTER: LngLat = LngLat::new(-157.8583, 21.3069);
pub const DEFAULT_ZOOM: f64 = 7.0;

#[cfg(target_arch = "wasm32")]
pub const DEFAULT_API_BASE: &str = "/api";
#[cfg(not(target_arch = "wasm32"))]
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000/api";

pub const ENV_TOKEN: &str = "MAPBOX_TOKEN";
pub const ENV_STYLE: &str = "MAPBOX_STYLE";
pub const ENV_API_BASE: &str = "SCRAPEY_API_BASE";
pub const ENV_INITIAL_ZOOM: &str = "SCRAPEY_INITIAL_ZOOM";
pub const ENV_SEARCH_DEBOUNCE_MS: &str = "SCRAPEY_SEARCH_DEBOUNCE_MS";
pub const ENV_SEARCH_LIMIT: &str = "SCRAPEY_SEARCH_LIMIT";
pub const ENV_FOCUS_ZOOM: &str = "SCRAPEY_FOCUS_ZOOM";
pub const ENV_FOCUS_DURATION_MS: &str = "SCRAPEY_FOCUS_DURATION_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingAccessToken,
    InvalidValue { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingAccessToken => {
                write!(f, "Mapbox token not configured. Set {ENV_TOKEN}.")
            }
            ConfigError::InvalidValue { key, value } => {
                write!(f, "invalid value for {key}: {value:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// How the map may start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessMode {
    Token(String),
    /// No credential: the page mounts and shows a diagnostic instead of a map.
    Diagnostic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub access_token: Option<String>,
    pub style_url: String,
    pub api_base: String,
    pub initial_center: LngLat,
    pub initial_zoom: f64,
    pub search_debounce_ms: u64,
    pub search_limit: usize,
    pub focus_zoom: f64,
    pub focus_duration_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            style_url: DEFAULT_STYLE_URL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            initial_center: DEFAULT_CENTER,
            initial_zoom: DEFAULT_ZOOM,
            search_debounce_ms: SEARCH_DEBOUNCE_MS,
            search_limit: SEARCH_LIMIT,
            focus_zoom: FOCUS_ZOOM,
            focus_duration_ms: FOCUS_DURATION_MS,
        }
    }
}

impl ViewerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from `lookup`, falling back to defaults for keys it
    /// does not answer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            access_token: lookup(ENV_TOKEN),
            style_url: lookup(ENV_STYLE).unwrap_or(defaults.style_url),
            api_base: lookup(ENV_API_BASE).unwrap_or(defaults.api_base),
            initial_center: defaults.initial_center,
            initial_zoom: env_var_parsed(&lookup, ENV_INITIAL_ZOOM, defaults.initial_zoom)?,
            search_debounce_ms: env_var_parsed(
                &lookup,
                ENV_SEARCH_DEBOUNCE_MS,
                defaults.search_debounce_ms,
            )?,
            search_limit: env_var_parsed(&lookup, ENV_SEARCH_LIMIT, defaults.search_limit)?,
            focus_zoom: env_var_parsed(&lookup, ENV_FOCUS_ZOOM, defaults.focus_zoom)?,
            focus_duration_ms: env_var_parsed(
                &lookup,
                ENV_FOCUS_DURATION_MS,
                defaults.focus_duration_ms,
            )?,
        })
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn access_mode(&self) -> AccessMode {
        match self.access_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => AccessMode::Token(token.to_string()),
            _ => AccessMode::Diagnostic,
        }
    }

    /// The access token, or the error the diagnostic view reports.
    pub fn require_token(&self) -> Result<String, ConfigError> {
        match self.access_mode() {
            AccessMode::Token(token) => Ok(token),
            AccessMode::Diagnostic => Err(ConfigError::MissingAccessToken),
        }
    }
}

fn env_var_parsed<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) if value.trim().is_empty() => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults_in_diagnostic_mode() {
        let config = ViewerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.access_mode(), AccessMode::Diagnostic);
        assert_eq!(config.style_url, "mapbox://styles/mapbox/dark-v11");
        assert_eq!(config.initial_center, LngLat::new(-157.8583, 21.3069));
        assert_eq!(config.initial_zoom, 7.0);
        assert_eq!(config.search_debounce_ms, 300);
        assert_eq!(config.search_limit, 20);
        assert_eq!(config.focus_zoom, 14.0);
        assert_eq!(config.focus_duration_ms, 1500);
    }

    #[test]
    fn token_and_overrides_are_read() {
        let config = ViewerConfig::from_lookup(lookup(&[
            (ENV_TOKEN, "pk.test"),
            (ENV_API_BASE, "http://api.local/api"),
            (ENV_SEARCH_DEBOUNCE_MS, "150"),
            (ENV_FOCUS_ZOOM, "15.5"),
        ]))
        .unwrap();
        assert_eq!(config.access_mode(), AccessMode::Token("pk.test".into()));
        assert_eq!(config.api_base, "http://api.local/api");
        assert_eq!(config.search_debounce_ms, 150);
        assert_eq!(config.focus_zoom, 15.5);
    }

    #[test]
    fn whitespace_token_counts_as_absent() {
        let config = ViewerConfig::default().with_access_token("   ");
        assert_eq!(config.access_mode(), AccessMode::Diagnostic);
        assert_eq!(config.require_token(), Err(ConfigError::MissingAccessToken));
    }

    #[test]
    fn unparsable_number_is_reported_with_its_key() {
        let err = ViewerConfig::from_lookup(lookup(&[(ENV_SEARCH_LIMIT, "lots")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_SEARCH_LIMIT,
                value: "lots".into()
            }
        );
        assert!(err.to_string().contains(ENV_SEARCH_LIMIT));
    }
}
