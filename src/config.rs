use std::env;
use std::path::PathBuf;

/// Environment variable overriding where the CSV tables live.
pub const DATA_DIR_ENV: &str = "LIBRARY_DATA_DIR";
/// Environment variable holding the `tracing` filter directive.
pub const LOG_FILTER_ENV: &str = "LIBRARY_LOG";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_LOG_FILTER: &str = "info";
const LOG_FILE_NAME: &str = "library.log";

/// Runtime settings handed to the store and the logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the tables, relative to the working directory unless
    /// absolute.
    pub data_dir: PathBuf,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            data_dir: non_blank(DATA_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            log_filter: non_blank(LOG_FILTER_ENV).unwrap_or(defaults.log_filter),
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_data_directory() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.log_path(), PathBuf::from("data").join("library.log"));
    }

    #[test]
    fn environment_overrides_and_blank_values() {
        let config = Config::from_lookup(|key| match key {
            DATA_DIR_ENV => Some("/srv/library".to_string()),
            LOG_FILTER_ENV => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.data_dir, PathBuf::from("/srv/library"));
        assert_eq!(config.log_filter, "info");
    }
}
