//! Configuration types.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::artifacts::ArtifactPaths;
use crate::error::ConfigError;
use crate::inference::DEFAULT_INFERENCE_TIMEOUT;

/// Which presentation adapter a process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frontend {
    Form,
    Dashboard,
}

impl Frontend {
    fn port_var(self) -> &'static str {
        match self {
            Self::Form => "PORT",
            Self::Dashboard => "DASHBOARD_PORT",
        }
    }

    fn default_port(self) -> u16 {
        match self {
            Self::Form => 5000,
            Self::Dashboard => 8501,
        }
    }
}

/// Service configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address to bind.
    pub host: String,
    pub port: u16,
    /// Classifier artifact.
    pub model_path: PathBuf,
    /// Preprocessor artifact.
    pub preprocessor_path: PathBuf,
    /// Bound on a single transform + predict call.
    pub inference_timeout: Duration,
}

impl AppConfig {
    pub fn from_env(frontend: Frontend) -> Self {
        Self::from_lookup(frontend, |key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparsable values fall back to
    /// their defaults with a warning.
    pub fn from_lookup(frontend: Frontend, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port_var = frontend.port_var();
        let port = parse_or(&lookup, port_var, frontend.default_port());
        let timeout_ms = parse_or(
            &lookup,
            "INFERENCE_TIMEOUT_MS",
            DEFAULT_INFERENCE_TIMEOUT.as_millis() as u64,
        );

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            model_path: lookup("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("model.json")),
            preprocessor_path: lookup("PREPROCESSOR_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("preprocessor.json")),
            inference_timeout: Duration::from_millis(timeout_ms.max(1)),
        }
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            preprocessor: self.preprocessor_path.clone(),
            classifier: self.model_path.clone(),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.host.parse().map_err(|e| ConfigError::InvalidValue {
            key: "HOST".to_string(),
            message: format!("{:?} is not an IP address: {}", self.host, e),
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, default = %default, "Invalid value, using default");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn form_defaults() {
        let config = AppConfig::from_lookup(Frontend::Form, lookup(&[]));
        assert_eq!(config.port, 5000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.model_path, PathBuf::from("model.json"));
        assert_eq!(config.preprocessor_path, PathBuf::from("preprocessor.json"));
        assert_eq!(config.inference_timeout, Duration::from_secs(2));
    }

    #[test]
    fn port_override_is_read_per_frontend() {
        let env = lookup(&[("PORT", "8000"), ("DASHBOARD_PORT", "9000")]);
        assert_eq!(AppConfig::from_lookup(Frontend::Form, &env).port, 8000);
        assert_eq!(AppConfig::from_lookup(Frontend::Dashboard, &env).port, 9000);
    }

    #[test]
    fn dashboard_default_port() {
        let config = AppConfig::from_lookup(Frontend::Dashboard, lookup(&[("PORT", "8000")]));
        assert_eq!(config.port, 8501);
    }

    #[test]
    fn invalid_port_falls_back_to_default() {
        let config = AppConfig::from_lookup(Frontend::Form, lookup(&[("PORT", "eighty")]));
        assert_eq!(config.port, 5000);
    }

    #[test]
    fn artifact_paths_and_timeout_overrides() {
        let config = AppConfig::from_lookup(
            Frontend::Form,
            lookup(&[
                ("MODEL_PATH", "/srv/m.json"),
                ("PREPROCESSOR_PATH", "/srv/p.json"),
                ("INFERENCE_TIMEOUT_MS", "250"),
            ]),
        );
        let paths = config.artifact_paths();
        assert_eq!(paths.classifier, PathBuf::from("/srv/m.json"));
        assert_eq!(paths.preprocessor, PathBuf::from("/srv/p.json"));
        assert_eq!(config.inference_timeout, Duration::from_millis(250));
    }

    #[test]
    fn socket_addr_rejects_hostnames() {
        let config = AppConfig::from_lookup(Frontend::Form, lookup(&[("HOST", "localhost")]));
        assert!(matches!(
            config.socket_addr(),
            Err(ConfigError::InvalidValue { .. })
        ));

        let config = AppConfig::from_lookup(Frontend::Form, lookup(&[("HOST", "127.0.0.1")]));
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:5000");
    }
}
