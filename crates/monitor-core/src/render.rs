use std::time::Duration;

use crate::config::{RenderParameters, TlsFallbackPolicy};
use crate::error::MonitorResult;
use crate::model::{
    AlertingConfig, AlertmanagerConfig, GlobalConfig, KubernetesSdConfig, PrometheusConfig,
    RelabelAction, RelabelConfig, ScrapeConfig, StaticConfig, TransportConfig,
};
use crate::pattern::RelabelRegex;

pub const PRIMARY_JOB_NAME: &str = "tidb-cluster";
pub const RULE_FILES_GLOB: &str = "/prometheus-rules/rules/*.rules.yml";
pub const SCRAPE_INTERVAL: Duration = Duration::from_secs(15);

pub const INSTANCE_LABEL: &str = "__meta_kubernetes_pod_label_app_kubernetes_io_instance";
pub const SCRAPE_LABEL: &str = "__meta_kubernetes_pod_annotation_prometheus_io_scrape";
pub const METRICS_PATH_LABEL: &str = "__meta_kubernetes_pod_annotation_prometheus_io_path";
pub const PORT_LABEL: &str = "__meta_kubernetes_pod_annotation_prometheus_io_port";
pub const NAMESPACE_LABEL: &str = "__meta_kubernetes_namespace";
pub const POD_NAME_LABEL: &str = "__meta_kubernetes_pod_name";
pub const NODE_NAME_LABEL: &str = "__meta_kubernetes_pod_node_name";
pub const POD_IP_LABEL: &str = "__meta_kubernetes_pod_ip";

pub const CA_FILE_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/ca.crt";
pub const CERT_FILE_PATH: &str = "/var/lib/pd-client-tls/cert";
pub const KEY_FILE_PATH: &str = "/var/lib/pd-client-tls/key";

/// Compiled patterns shared by every render. Built once at startup and only
/// read afterwards.
#[derive(Debug, Clone)]
pub struct RenderContext {
    scrape_enabled: RelabelRegex,
    any_value: RelabelRegex,
    address_port: RelabelRegex,
    fallback: Option<FallbackJob>,
}

#[derive(Debug, Clone)]
struct FallbackJob {
    job_name: String,
    pod_name_regex: RelabelRegex,
}

impl RenderContext {
    pub fn new(policy: &TlsFallbackPolicy) -> MonitorResult<Self> {
        let fallback = if policy.enabled {
            Some(FallbackJob {
                job_name: policy.job_name.clone(),
                pod_name_regex: RelabelRegex::new(policy.pod_name_regex.as_str())?,
            })
        } else {
            None
        };

        Ok(Self {
            scrape_enabled: RelabelRegex::new("true")?,
            any_value: RelabelRegex::new("(.+)")?,
            address_port: RelabelRegex::new(r"([^:]+)(?::\d+)?;(\d+)")?,
            fallback,
        })
    }

    pub fn fallback_job_name(&self) -> Option<&str> {
        self.fallback.as_ref().map(|f| f.job_name.as_str())
    }
}

/// Turns [`RenderParameters`] into a `prometheus.yml` document.
#[derive(Debug, Clone)]
pub struct ConfigRenderer {
    context: RenderContext,
}

impl ConfigRenderer {
    pub fn new(context: RenderContext) -> Self {
        Self { context }
    }

    /// Assemble the config model without serializing it.
    pub fn build(&self, params: &RenderParameters) -> PrometheusConfig {
        if params.namespaces.is_empty() {
            tracing::warn!("No namespaces given; the scrape job will not discover any pods");
        }

        let mut config = base_config(&self.context, params);
        if params.enable_tls {
            config = with_tls(config, &self.context, params);
        }
        if !params.alertmanager_url.is_empty() {
            config = with_alertmanager(config, &params.alertmanager_url);
        }
        config
    }

    pub fn render(&self, params: &RenderParameters) -> MonitorResult<String> {
        let config = self.build(params);
        let yaml = config.to_yaml()?;
        tracing::debug!(
            jobs = config.scrape_configs.len(),
            tls = params.enable_tls,
            alerting = config.alerting.is_some(),
            bytes = yaml.len(),
            "Rendered Prometheus config"
        );
        Ok(yaml)
    }
}

/// Single plaintext job over every pod of the selected clusters.
pub fn base_config(ctx: &RenderContext, params: &RenderParameters) -> PrometheusConfig {
    PrometheusConfig {
        global: GlobalConfig {
            scrape_interval: SCRAPE_INTERVAL,
            evaluation_interval: SCRAPE_INTERVAL,
        },
        rule_files: vec![RULE_FILES_GLOB.to_string()],
        scrape_configs: vec![ScrapeConfig {
            job_name: PRIMARY_JOB_NAME.to_string(),
            honor_labels: true,
            scrape_interval: SCRAPE_INTERVAL,
            transport: TransportConfig::plaintext(),
            kubernetes_sd_configs: vec![KubernetesSdConfig::pods_in(&params.namespaces)],
            relabel_configs: vec![
                RelabelConfig::keep(INSTANCE_LABEL, &params.target_regex),
                RelabelConfig::keep(SCRAPE_LABEL, &ctx.scrape_enabled),
                RelabelConfig::copy(METRICS_PATH_LABEL, "__metrics_path__")
                    .with_regex(&ctx.any_value),
                RelabelConfig::copy(NAMESPACE_LABEL, "kubernetes_namespace"),
                RelabelConfig::copy(POD_NAME_LABEL, "instance"),
                RelabelConfig::copy(INSTANCE_LABEL, "cluster"),
            ],
        }],
        alerting: None,
    }
}

/// Switch the primary job to mutual TLS and, when the fallback policy is
/// enabled, move TiKV pods to a plaintext job of their own.
pub fn with_tls(
    mut config: PrometheusConfig,
    ctx: &RenderContext,
    params: &RenderParameters,
) -> PrometheusConfig {
    if let Some(primary) = config
        .scrape_configs
        .iter_mut()
        .find(|s| s.job_name == PRIMARY_JOB_NAME)
    {
        primary.transport = TransportConfig::mutual_tls(CA_FILE_PATH, CERT_FILE_PATH, KEY_FILE_PATH);
        if let Some(ref fallback) = ctx.fallback {
            primary
                .relabel_configs
                .push(RelabelConfig::drop(POD_NAME_LABEL, &fallback.pod_name_regex));
        }
    }

    if let Some(ref fallback) = ctx.fallback {
        config
            .scrape_configs
            .push(fallback_job(ctx, params, &fallback.job_name));
    }

    config
}

fn fallback_job(ctx: &RenderContext, params: &RenderParameters, job_name: &str) -> ScrapeConfig {
    ScrapeConfig {
        job_name: job_name.to_string(),
        honor_labels: true,
        scrape_interval: SCRAPE_INTERVAL,
        transport: TransportConfig::plaintext(),
        kubernetes_sd_configs: vec![KubernetesSdConfig::pods_in(&params.namespaces)],
        relabel_configs: vec![
            RelabelConfig::keep(INSTANCE_LABEL, &params.target_regex),
            RelabelConfig::keep(SCRAPE_LABEL, &ctx.scrape_enabled),
            RelabelConfig::copy(METRICS_PATH_LABEL, "__metrics_path__").with_regex(&ctx.any_value),
            // host[:port];annotated_port -> host:annotated_port
            RelabelConfig {
                source_labels: vec!["__address__".to_string(), PORT_LABEL.to_string()],
                action: RelabelAction::Replace,
                regex: Some(ctx.address_port.clone()),
                replacement: Some("$1:$2".to_string()),
                target_label: Some("__address__".to_string()),
            },
            RelabelConfig::copy(NAMESPACE_LABEL, "kubernetes_namespace"),
            RelabelConfig::copy(NODE_NAME_LABEL, "kubernetes_node"),
            RelabelConfig::copy(POD_IP_LABEL, "kubernetes_pod_ip"),
        ],
    }
}

/// Point alerts at a single Alertmanager. Replaces any previous alerting
/// section.
pub fn with_alertmanager(mut config: PrometheusConfig, url: &str) -> PrometheusConfig {
    config.alerting = Some(AlertingConfig {
        alertmanagers: vec![AlertmanagerConfig {
            static_configs: vec![StaticConfig {
                targets: vec![url.to_string()],
            }],
        }],
    });
    config
}
