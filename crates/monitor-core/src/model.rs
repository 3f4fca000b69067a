//! Typed subset of the Prometheus configuration file.
//!
//! Only the parts this crate renders are modelled. Optional fields are left
//! out of the output when unset so the YAML stays close to what an operator
//! would write by hand.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::MonitorResult;
use crate::pattern::RelabelRegex;

/// Top-level `prometheus.yml` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrometheusConfig {
    pub global: GlobalConfig,
    pub rule_files: Vec<String>,
    pub scrape_configs: Vec<ScrapeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerting: Option<AlertingConfig>,
}

impl PrometheusConfig {
    pub fn scrape_config(&self, job_name: &str) -> Option<&ScrapeConfig> {
        self.scrape_configs.iter().find(|s| s.job_name == job_name)
    }

    pub fn to_yaml(&self) -> MonitorResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(with = "humantime_serde")]
    pub scrape_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub evaluation_interval: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeConfig {
    pub job_name: String,
    pub honor_labels: bool,
    #[serde(with = "humantime_serde")]
    pub scrape_interval: Duration,
    #[serde(flatten)]
    pub transport: TransportConfig,
    pub kubernetes_sd_configs: Vec<KubernetesSdConfig>,
    pub relabel_configs: Vec<RelabelConfig>,
}

/// How Prometheus connects to a scrape target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig {
    pub scheme: Scheme,
    pub tls_config: TlsConfig,
}

impl TransportConfig {
    /// Plain HTTP. Certificate verification is switched off so that a
    /// target answering on TLS anyway does not fail the scrape.
    pub fn plaintext() -> Self {
        Self {
            scheme: Scheme::Http,
            tls_config: TlsConfig {
                insecure_skip_verify: true,
                ..TlsConfig::default()
            },
        }
    }

    pub fn mutual_tls(ca_file: &str, cert_file: &str, key_file: &str) -> Self {
        Self {
            scheme: Scheme::Https,
            tls_config: TlsConfig {
                ca_file: Some(ca_file.to_string()),
                cert_file: Some(cert_file.to_string()),
                key_file: Some(key_file.to_string()),
                insecure_skip_verify: false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Https => write!(f, "https"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TlsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub insecure_skip_verify: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KubernetesSdConfig {
    pub role: KubernetesRole,
    pub namespaces: NamespaceDiscovery,
}

impl KubernetesSdConfig {
    pub fn pods_in(namespaces: &[String]) -> Self {
        Self {
            role: KubernetesRole::Pod,
            namespaces: NamespaceDiscovery {
                names: namespaces.to_vec(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KubernetesRole {
    Pod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceDiscovery {
    pub names: Vec<String>,
}

/// One step of the relabel pipeline. Steps run in order on the same label
/// set, so a `keep`/`drop` removes the target before later steps see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelabelConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_labels: Vec<String>,
    pub action: RelabelAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<RelabelRegex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_label: Option<String>,
}

impl RelabelConfig {
    pub fn keep(source_label: &str, regex: &RelabelRegex) -> Self {
        Self::filter(RelabelAction::Keep, source_label, regex)
    }

    pub fn drop(source_label: &str, regex: &RelabelRegex) -> Self {
        Self::filter(RelabelAction::Drop, source_label, regex)
    }

    /// Copy `source_label` into `target_label` unchanged.
    pub fn copy(source_label: &str, target_label: &str) -> Self {
        Self {
            source_labels: vec![source_label.to_string()],
            action: RelabelAction::Replace,
            regex: None,
            replacement: None,
            target_label: Some(target_label.to_string()),
        }
    }

    fn filter(action: RelabelAction, source_label: &str, regex: &RelabelRegex) -> Self {
        Self {
            source_labels: vec![source_label.to_string()],
            action,
            regex: Some(regex.clone()),
            replacement: None,
            target_label: None,
        }
    }

    pub fn with_regex(mut self, regex: &RelabelRegex) -> Self {
        self.regex = Some(regex.clone());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelabelAction {
    Keep,
    Drop,
    Replace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertingConfig {
    pub alertmanagers: Vec<AlertmanagerConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertmanagerConfig {
    pub static_configs: Vec<StaticConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticConfig {
    pub targets: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plaintext_transport_serializes_flat() {
        let yaml = serde_yaml::to_string(&TransportConfig::plaintext()).unwrap();
        assert!(yaml.contains("scheme: http\n"));
        assert!(yaml.contains("insecure_skip_verify: true"));
        assert!(!yaml.contains("ca_file"));
    }

    #[test]
    fn mutual_tls_omits_skip_verify() {
        let transport = TransportConfig::mutual_tls("/ca", "/cert", "/key");
        assert_eq!(transport.scheme, Scheme::Https);
        let yaml = serde_yaml::to_string(&transport).unwrap();
        assert!(yaml.contains("scheme: https"));
        assert!(yaml.contains("ca_file: /ca"));
        assert!(!yaml.contains("insecure_skip_verify"));
    }

    #[test]
    fn copy_rule_has_no_regex() {
        let rule = RelabelConfig::copy("__meta_kubernetes_namespace", "kubernetes_namespace");
        let yaml = serde_yaml::to_string(&rule).unwrap();
        assert!(yaml.contains("action: replace"));
        assert!(yaml.contains("target_label: kubernetes_namespace"));
        assert!(!yaml.contains("regex"));
    }

    #[test]
    fn durations_render_in_prometheus_notation() {
        let global = GlobalConfig {
            scrape_interval: Duration::from_secs(15),
            evaluation_interval: Duration::from_secs(15),
        };
        let yaml = serde_yaml::to_string(&global).unwrap();
        assert_eq!(yaml, "scrape_interval: 15s\nevaluation_interval: 15s\n");
    }
}
