use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use monitor_core::config::{MonitorConfig, RenderParameters};
use monitor_core::pattern::RelabelRegex;
use monitor_core::render::{ConfigRenderer, RenderContext};

use crate::output::write_document;

#[derive(Args, Debug, Default)]
pub struct RenderArgs {
    /// Parameter file (YAML). Flags below override its values.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Namespace to discover pods in (repeatable)
    #[arg(
        short,
        long = "namespace",
        env = "TIDB_MONITOR_NAMESPACES",
        value_delimiter = ','
    )]
    pub namespaces: Vec<String>,

    /// Alertmanager address, e.g. alertmanager:9093
    #[arg(long, env = "TIDB_MONITOR_ALERTMANAGER_URL")]
    pub alertmanager_url: Option<String>,

    /// Regex matched against the pods' app.kubernetes.io/instance label
    #[arg(long, conflicts_with = "clusters")]
    pub target_regex: Option<RelabelRegex>,

    /// Cluster name to monitor (repeatable); shorthand for an exact-match target regex
    #[arg(long = "cluster")]
    pub clusters: Vec<String>,

    /// Scrape the cluster over mutual TLS
    #[arg(long)]
    pub tls: bool,

    /// Do not split TiKV pods into a plaintext job when TLS is on
    #[arg(long)]
    pub no_tikv_fallback: bool,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn execute(args: RenderArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;
    let context = RenderContext::new(&config.tls_fallback)?;
    let renderer = ConfigRenderer::new(context);

    let params = &config.parameters;
    tracing::info!(
        namespaces = ?params.namespaces,
        target_regex = %params.target_regex,
        tls = params.enable_tls,
        alertmanager = %params.alertmanager_url,
        "Rendering Prometheus config"
    );

    let yaml = renderer.render(params)?;
    write_document(args.output.as_deref(), &yaml)?;
    Ok(())
}

/// Parameter file first, then flags and environment on top.
pub fn resolve_config(args: &RenderArgs) -> anyhow::Result<MonitorConfig> {
    let target_override = target_regex_from_args(args)?;

    let mut config = match args.config {
        Some(ref path) => MonitorConfig::from_file(path)?,
        None => {
            let target_regex = target_override.clone().context(
                "No target pattern: pass --config, --target-regex or at least one --cluster",
            )?;
            MonitorConfig::new(RenderParameters::new(Vec::new(), target_regex))
        }
    };

    if let Some(target_regex) = target_override {
        config.parameters.target_regex = target_regex;
    }
    if !args.namespaces.is_empty() {
        config.parameters.namespaces = args.namespaces.clone();
    }
    if let Some(ref url) = args.alertmanager_url {
        config.parameters.alertmanager_url = url.clone();
    }
    if args.tls {
        config.parameters.enable_tls = true;
    }
    if args.no_tikv_fallback {
        config.tls_fallback.enabled = false;
    }

    Ok(config)
}

fn target_regex_from_args(args: &RenderArgs) -> anyhow::Result<Option<RelabelRegex>> {
    if let Some(ref regex) = args.target_regex {
        return Ok(Some(regex.clone()));
    }
    if args.clusters.is_empty() {
        return Ok(None);
    }
    Ok(Some(RelabelRegex::any_of(&args.clusters)?))
}
