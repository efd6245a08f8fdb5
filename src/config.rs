/// Default OpenWeatherMap data API (current weather, forecast).
const DEFAULT_OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
/// Default OpenWeatherMap geocoding API.
const DEFAULT_OPENWEATHER_GEO_URL: &str = "https://api.openweathermap.org/geo/1.0";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PORT must be a valid u16, got '{0}'")]
    InvalidPort(String),
}

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// OpenWeatherMap credential. Requests fail with a configuration error when absent.
    pub openweather_api_key: Option<String>,
    pub openweather_base_url: String,
    pub openweather_geo_url: String,
    pub port: u16,
    /// Browser origin allowed by CORS.
    pub frontend_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => 5000,
        };

        Ok(Self {
            openweather_api_key: get("OPENWEATHERMAP_API_KEY"),
            openweather_base_url: get("OPENWEATHERMAP_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENWEATHER_BASE_URL.to_string()),
            openweather_geo_url: get("OPENWEATHERMAP_GEO_URL")
                .unwrap_or_else(|| DEFAULT_OPENWEATHER_GEO_URL.to_string()),
            port,
            frontend_url: get("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
        })
    }
}
