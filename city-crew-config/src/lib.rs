use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_JOIN_CODE_LENGTH: usize = 3;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Length of freshly allocated join codes.
    #[serde(default = "default_join_code_length")]
    pub join_code_length: usize,
    /// Optional `tracing` filter directive, e.g. `city_crew_backend=debug`.
    #[serde(default)]
    pub tracing_directive: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            join_code_length: DEFAULT_JOIN_CODE_LENGTH,
            tracing_directive: None,
        }
    }
}

const fn default_join_code_length() -> usize {
    DEFAULT_JOIN_CODE_LENGTH
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Extract(#[from] figment::Error),
}

/// Reads `city-crew.toml` merged with `CITY_CREW_`-prefixed environment
/// variables.
pub fn get_config() -> Result<Config, ConfigError> {
    Ok(Figment::new()
        .merge(Toml::file("city-crew.toml"))
        .merge(Env::prefixed("CITY_CREW_"))
        .extract()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_any_source() {
        figment::Jail::expect_with(|_jail| {
            let config = get_config().unwrap();
            assert_eq!(config.join_code_length, DEFAULT_JOIN_CODE_LENGTH);
            assert_eq!(config.tracing_directive, None);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_code_length() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("CITY_CREW_JOIN_CODE_LENGTH", "5");
            let config = get_config().unwrap();
            assert_eq!(config.join_code_length, 5);
            Ok(())
        });
    }
}
