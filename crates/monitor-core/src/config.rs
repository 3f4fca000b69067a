use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{MonitorError, MonitorResult};
use crate::pattern::RelabelRegex;

/// Inputs for one render of the Prometheus config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderParameters {
    /// Alertmanager address, e.g. "alertmanager:9093". Empty means no alerting.
    #[serde(default)]
    pub alertmanager_url: String,
    /// Namespaces whose pods are discovered, in order.
    #[serde(default)]
    pub namespaces: Vec<String>,
    /// Matched against the pod's `app.kubernetes.io/instance` label.
    pub target_regex: RelabelRegex,
    #[serde(default)]
    pub enable_tls: bool,
}

impl RenderParameters {
    pub fn new(namespaces: Vec<String>, target_regex: RelabelRegex) -> Self {
        Self {
            alertmanager_url: String::new(),
            namespaces,
            target_regex,
            enable_tls: false,
        }
    }

    pub fn with_alertmanager(mut self, url: impl Into<String>) -> Self {
        self.alertmanager_url = url.into();
        self
    }

    pub fn with_tls(mut self, enable_tls: bool) -> Self {
        self.enable_tls = enable_tls;
        self
    }
}

/// Dedicated plaintext job for pods that cannot serve metrics over TLS.
///
/// TiKV does not expose its status port over TLS yet
/// (https://github.com/tikv/tikv/issues/5340). Until it does, TiKV pods are
/// dropped from the TLS job and scraped by this one instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TlsFallbackPolicy {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_fallback_job")]
    pub job_name: String,
    /// Matched against the pod name.
    #[serde(default = "default_fallback_pod_regex")]
    pub pod_name_regex: String,
}

fn default_true() -> bool {
    true
}

fn default_fallback_job() -> String {
    "tidb-cluster-tikv".to_string()
}

fn default_fallback_pod_regex() -> String {
    r".*\-tikv\-\d*$".to_string()
}

impl Default for TlsFallbackPolicy {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            job_name: default_fallback_job(),
            pod_name_regex: default_fallback_pod_regex(),
        }
    }
}

/// Parameter file accepted by the CLI.
///
/// ```yaml
/// alertmanager_url: alertmanager:9093
/// namespaces: [tidb]
/// target_regex: basic
/// enable_tls: true
/// tls_fallback:
///   enabled: true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MonitorConfigFile", into = "MonitorConfigFile")]
pub struct MonitorConfig {
    pub parameters: RenderParameters,
    pub tls_fallback: TlsFallbackPolicy,
}

/// On-disk layout of [`MonitorConfig`]: the render parameters sit at the top
/// level next to `tls_fallback`. Spelled out field by field rather than
/// flattened, so scalars such as `namespaces: [2024]` reach `String` as-is.
#[derive(Serialize, Deserialize)]
struct MonitorConfigFile {
    #[serde(default)]
    alertmanager_url: String,
    #[serde(default)]
    namespaces: Vec<String>,
    target_regex: RelabelRegex,
    #[serde(default)]
    enable_tls: bool,
    #[serde(default)]
    tls_fallback: TlsFallbackPolicy,
}

impl From<MonitorConfigFile> for MonitorConfig {
    fn from(file: MonitorConfigFile) -> Self {
        Self {
            parameters: RenderParameters {
                alertmanager_url: file.alertmanager_url,
                namespaces: file.namespaces,
                target_regex: file.target_regex,
                enable_tls: file.enable_tls,
            },
            tls_fallback: file.tls_fallback,
        }
    }
}

impl From<MonitorConfig> for MonitorConfigFile {
    fn from(config: MonitorConfig) -> Self {
        let MonitorConfig {
            parameters,
            tls_fallback,
        } = config;
        Self {
            alertmanager_url: parameters.alertmanager_url,
            namespaces: parameters.namespaces,
            target_regex: parameters.target_regex,
            enable_tls: parameters.enable_tls,
            tls_fallback,
        }
    }
}

impl MonitorConfig {
    pub fn new(parameters: RenderParameters) -> Self {
        Self {
            parameters,
            tls_fallback: TlsFallbackPolicy::default(),
        }
    }

    pub fn from_file(path: &Path) -> MonitorResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MonitorError::Config(format!("Cannot read {}: {e}", path.display())))?;
        serde_yaml::from_str(&content).map_err(|e| {
            MonitorError::Config(format!("Invalid YAML in {}: {e}", path.display()))
        })
    }

    pub fn from_yaml(content: &str) -> MonitorResult<Self> {
        serde_yaml::from_str(content).map_err(|e| MonitorError::Config(format!("Invalid YAML: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_file_uses_defaults() {
        let config = MonitorConfig::from_yaml("target_regex: basic\n").unwrap();
        assert_eq!(config.parameters.target_regex.as_str(), "basic");
        assert!(config.parameters.alertmanager_url.is_empty());
        assert!(config.parameters.namespaces.is_empty());
        assert!(!config.parameters.enable_tls);
        assert_eq!(config.tls_fallback, TlsFallbackPolicy::default());
    }

    #[test]
    fn full_file() {
        let yaml = r#"
alertmanager_url: "alertmgr:9093"
namespaces: [ns1, ns2]
target_regex: "myapp.*"
enable_tls: true
tls_fallback:
  enabled: false
"#;
        let config = MonitorConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.parameters.alertmanager_url, "alertmgr:9093");
        assert_eq!(config.parameters.namespaces, vec!["ns1", "ns2"]);
        assert!(config.parameters.enable_tls);
        assert!(!config.tls_fallback.enabled);
        assert_eq!(config.tls_fallback.job_name, "tidb-cluster-tikv");
    }

    #[test]
    fn target_regex_is_required() {
        let err = MonitorConfig::from_yaml("namespaces: [ns1]\n").unwrap_err();
        assert!(matches!(err, MonitorError::Config(_)));
    }

    #[test]
    fn invalid_target_regex_is_rejected() {
        assert!(MonitorConfig::from_yaml("target_regex: '(oops'\n").is_err());
    }

    #[test]
    fn numeric_looking_scalars_stay_strings() {
        let config = MonitorConfig::from_yaml("namespaces: [2024, tidb]\ntarget_regex: 1\n").unwrap();
        assert_eq!(config.parameters.namespaces, vec!["2024", "tidb"]);
        assert_eq!(config.parameters.target_regex.as_str(), "1");
    }

    #[test]
    fn file_round_trip_keeps_top_level_layout() {
        let config = MonitorConfig::from_yaml("namespaces: [ns1]\ntarget_regex: basic\n").unwrap();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("target_regex: basic"));
        assert!(yaml.contains("tls_fallback:"));
        assert!(!yaml.contains("parameters"));
        assert_eq!(MonitorConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn invalid_file_reports_path_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"namespaces: {not: a list}\ntarget_regex: x\n").unwrap();
        let message = MonitorConfig::from_file(file.path()).unwrap_err().to_string();
        assert_eq!(message.matches("Configuration error").count(), 1);
        assert_eq!(message.matches(&*file.path().display().to_string()).count(), 1);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = MonitorConfig::from_file(Path::new("/nonexistent/monitor.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/monitor.yaml"));
    }
}
