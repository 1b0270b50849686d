//! Server settings read from the environment.
//!
//! | Variable           | Default              |
//! |--------------------|----------------------|
//! | `FIELD_HOST`       | `127.0.0.1`          |
//! | `FIELD_PORT`       | `8080`               |
//! | `FIELD_DATABASE`   | `field_data.sqlite`  |
//! | `FIELD_JSON_LIMIT` | `10485760` (10 MiB)  |

use log::warn;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE: &str = "field_data.sqlite";
const DEFAULT_JSON_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: PathBuf,
    pub json_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: PathBuf::from(DEFAULT_DATABASE),
            json_limit: DEFAULT_JSON_LIMIT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("FIELD_HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "FIELD_PORT").unwrap_or(defaults.port),
            database: lookup("FIELD_DATABASE")
                .map(PathBuf::from)
                .unwrap_or(defaults.database),
            json_limit: parsed(&lookup, "FIELD_JSON_LIMIT").unwrap_or(defaults.json_limit),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        assert_eq!(AppConfig::from_lookup(|_| None), AppConfig::default());
    }

    #[test]
    fn overrides_are_read_and_bad_numbers_fall_back() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("FIELD_HOST", "0.0.0.0"),
            ("FIELD_PORT", "not-a-port"),
            ("FIELD_DATABASE", "/tmp/forms.sqlite"),
            ("FIELD_JSON_LIMIT", "2048"),
        ]));

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.database, PathBuf::from("/tmp/forms.sqlite"));
        assert_eq!(config.json_limit, 2048);
        assert_eq!(config.url(), "http://0.0.0.0:8080");
    }
}
