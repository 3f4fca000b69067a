use std::path::PathBuf;

use clap::Args;

use monitor_core::config::MonitorConfig;
use monitor_core::render::{ConfigRenderer, RenderContext};

#[derive(Args)]
pub struct ValidateArgs {
    /// Path to the parameter file to validate
    pub config: PathBuf,
}

pub fn execute(args: ValidateArgs) -> anyhow::Result<()> {
    println!("Validating {}...", args.config.display());

    let mut errors = Vec::new();

    let config = match MonitorConfig::from_file(&args.config) {
        Ok(config) => {
            println!("  YAML parsing: OK");
            config
        }
        Err(e) => {
            println!("  YAML parsing: INVALID - {e}");
            println!("\nValidation FAILED");
            std::process::exit(1);
        }
    };

    let params = &config.parameters;
    println!("  Target regex: {}", params.target_regex);
    if params.namespaces.is_empty() {
        println!("  Namespaces: (none) - WARNING: no pods would be discovered");
    } else {
        println!("  Namespaces: {}", params.namespaces.join(", "));
    }

    match RenderContext::new(&config.tls_fallback) {
        Ok(context) => {
            match context.fallback_job_name() {
                Some(job) => println!("  TLS fallback policy: OK (job '{job}')"),
                None => println!("  TLS fallback policy: OK (disabled)"),
            }
            let renderer = ConfigRenderer::new(context);
            let rendered = renderer.build(params);
            match rendered.to_yaml() {
                Ok(yaml) => {
                    println!("  Render: OK ({} bytes)", yaml.len());
                    println!("  Scrape jobs: {}", rendered.scrape_configs.len());
                    for job in &rendered.scrape_configs {
                        println!("    {} ({})", job.job_name, job.transport.scheme);
                    }
                    match rendered.alerting {
                        Some(_) => println!("  Alerting: {}", params.alertmanager_url),
                        None => println!("  Alerting: (none)"),
                    }
                }
                Err(e) => {
                    println!("  Render: FAILED - {e}");
                    errors.push(format!("render failed: {e}"));
                }
            }
        }
        Err(e) => {
            println!("  TLS fallback policy: INVALID - {e}");
            errors.push(format!("invalid TLS fallback policy: {e}"));
        }
    }

    println!();
    if errors.is_empty() {
        println!("Validation PASSED");
    } else {
        println!("Validation FAILED with {} error(s):", errors.len());
        for err in &errors {
            eprintln!("  - {err}");
        }
        std::process::exit(1);
    }

    Ok(())
}
