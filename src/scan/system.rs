//! Black Duck scan backend descriptor.

use url::Url;

use super::error::ArgumentError;
use crate::config::DetectConfig;

/// Identity of the Black Duck server a scan reports to.
///
/// Built once per run and shared by the primary and image scan passes.
#[derive(Clone, PartialEq, Eq)]
pub struct BlackDuckSystem {
    server_url: Url,
    token: String,
    project_name: String,
    trust_store: Vec<String>,
}

impl std::fmt::Debug for BlackDuckSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlackDuckSystem")
            .field("server_url", &self.server_url.as_str())
            .field("token", &"****")
            .field("project_name", &self.project_name)
            .field("trust_store", &self.trust_store)
            .finish()
    }
}

impl BlackDuckSystem {
    pub fn from_config(config: &DetectConfig) -> Result<Self, ArgumentError> {
        let raw_url = config.server_url.trim();
        if raw_url.is_empty() {
            return Err(ArgumentError::MissingField("server_url"));
        }
        let server_url = Url::parse(raw_url).map_err(|e| ArgumentError::MalformedField {
            field: "server_url",
            message: e.to_string(),
        })?;
        if !matches!(server_url.scheme(), "http" | "https") {
            return Err(ArgumentError::MalformedField {
                field: "server_url",
                message: format!("unsupported scheme {:?}", server_url.scheme()),
            });
        }

        if config.token.trim().is_empty() {
            return Err(ArgumentError::MissingField("token"));
        }
        if config.project_name.trim().is_empty() {
            return Err(ArgumentError::MissingField("project_name"));
        }

        Ok(Self {
            server_url,
            token: config.token.trim().to_string(),
            project_name: config.project_name.clone(),
            trust_store: config.custom_tls_certificates.clone(),
        })
    }

    /// Server URL without a trailing slash.
    pub fn server_url(&self) -> &str {
        self.server_url.as_str().trim_end_matches('/')
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Connectivity and authentication arguments.
    pub fn connection_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--blackduck.url={}", self.server_url()),
            format!("--blackduck.api.token={}", self.token),
        ];
        if !self.trust_store.is_empty() {
            args.push(format!(
                "--blackduck.trust.cert.paths={}",
                self.trust_store.join(",")
            ));
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::valid_config;

    #[test]
    fn test_from_valid_config() {
        let system = BlackDuckSystem::from_config(&valid_config()).unwrap();
        assert_eq!(system.server_url(), "https://blackduck.example.com");
        assert_eq!(system.project_name(), "shop");
        assert_eq!(
            system.connection_args(),
            vec![
                "--blackduck.url=https://blackduck.example.com",
                "--blackduck.api.token=secret-token",
            ]
        );
    }

    #[test]
    fn test_missing_token() {
        let config = DetectConfig {
            token: "  ".into(),
            ..valid_config()
        };
        assert!(matches!(
            BlackDuckSystem::from_config(&config),
            Err(ArgumentError::MissingField("token"))
        ));
    }

    #[test]
    fn test_malformed_url() {
        let config = DetectConfig {
            server_url: "ftp://blackduck".into(),
            ..valid_config()
        };
        assert!(matches!(
            BlackDuckSystem::from_config(&config),
            Err(ArgumentError::MalformedField { .. })
        ));
    }

    #[test]
    fn test_trust_store_argument() {
        let config = DetectConfig {
            custom_tls_certificates: vec!["/certs/a.pem".into(), "/certs/b.pem".into()],
            ..valid_config()
        };
        let system = BlackDuckSystem::from_config(&config).unwrap();
        assert_eq!(
            system.connection_args().last().map(String::as_str),
            Some("--blackduck.trust.cert.paths=/certs/a.pem,/certs/b.pem")
        );
    }

    #[test]
    fn test_debug_hides_token() {
        let system = BlackDuckSystem::from_config(&valid_config()).unwrap();
        let debug = format!("{:?}", system);
        assert!(!debug.contains("secret-token"));
    }
}
