use serde::{Deserialize, Deserializer};
use tracing::level_filters::LevelFilter;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_redis_host")]
    pub redis_host: String,
    #[serde(default = "default_redis_port")]
    pub redis_port: u16,
    #[serde(default = "default_redis_channel")]
    pub redis_channel: String,
    #[serde(default = "default_config_file_path")]
    pub config_file_path: std::path::PathBuf,
    #[serde(default = "default_pipeline_queue_name")]
    pub pipeline_queue_name: String,
    #[serde(default, deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        // An empty variable falls back to the default, same as an unset one.
        envy::from_iter(vars.into_iter().filter(|(_, value)| !value.is_empty()))
    }

    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/", self.redis_host, self.redis_port)
    }
}

fn default_redis_host() -> String {
    "localhost".into()
}

fn default_redis_port() -> u16 {
    6379
}

fn default_redis_channel() -> String {
    "github-webhook-push".into()
}

fn default_config_file_path() -> std::path::PathBuf {
    "config.json".into()
}

fn default_pipeline_queue_name() -> String {
    "pipeline".into()
}

/// Verbosity named by `LOG_LEVEL`. Unknown names fall back to `Info`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn parse(level: &str) -> Self {
        match level {
            "DEBUG" => Self::Debug,
            "INFO" => Self::Info,
            "WARN" | "WARNING" => Self::Warn,
            "ERROR" => Self::Error,
            _ => Self::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

fn deserialize_log_level<'de, D>(de: D) -> Result<LogLevel, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(de).map(|s| LogLevel::parse(&s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_vars(Vec::new()).unwrap();

        assert_eq!(config.redis_host, "localhost");
        assert_eq!(config.redis_port, 6379);
        assert_eq!(config.redis_channel, "github-webhook-push");
        assert_eq!(config.config_file_path, std::path::Path::new("config.json"));
        assert_eq!(config.pipeline_queue_name, "pipeline");
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.redis_url(), "redis://localhost:6379/");
    }

    #[test]
    fn custom_values_override_defaults() {
        let config = Config::from_vars(vars(&[
            ("REDIS_HOST", "redis-server"),
            ("REDIS_PORT", "6380"),
            ("REDIS_CHANNEL", "custom-channel"),
            ("CONFIG_FILE_PATH", "/path/to/config.json"),
            ("PIPELINE_QUEUE_NAME", "custom-pipeline"),
            ("LOG_LEVEL", "DEBUG"),
        ]))
        .unwrap();

        assert_eq!(config.redis_host, "redis-server");
        assert_eq!(config.redis_port, 6380);
        assert_eq!(config.redis_channel, "custom-channel");
        assert_eq!(
            config.config_file_path,
            std::path::Path::new("/path/to/config.json")
        );
        assert_eq!(config.pipeline_queue_name, "custom-pipeline");
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.redis_url(), "redis://redis-server:6380/");
    }

    #[test]
    fn empty_variables_fall_back_to_defaults() {
        let config =
            Config::from_vars(vars(&[("REDIS_HOST", ""), ("PIPELINE_QUEUE_NAME", "")])).unwrap();

        assert_eq!(config.redis_host, "localhost");
        assert_eq!(config.pipeline_queue_name, "pipeline");
    }

    #[test]
    fn unrelated_variables_are_ignored() {
        let config = Config::from_vars(vars(&[("HOME", "/root"), ("PATH", "/bin")])).unwrap();
        assert_eq!(config.redis_host, "localhost");
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        assert!(Config::from_vars(vars(&[("REDIS_PORT", "redis")])).is_err());
    }

    #[test]
    fn log_level_names() {
        let cases = [
            ("DEBUG", LogLevel::Debug),
            ("INFO", LogLevel::Info),
            ("WARN", LogLevel::Warn),
            ("WARNING", LogLevel::Warn),
            ("ERROR", LogLevel::Error),
            ("invalid", LogLevel::Info),
            ("debug", LogLevel::Info),
            ("", LogLevel::Info),
        ];
        for (input, expected) in cases {
            assert_eq!(LogLevel::parse(input), expected, "input {:?}", input);
        }
    }

    #[test]
    fn unknown_log_level_in_env_is_info() {
        let config = Config::from_vars(vars(&[("LOG_LEVEL", "LOUD")])).unwrap();
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(LevelFilter::from(config.log_level), LevelFilter::INFO);
    }
}
