//! Prometheus and Grafana configuration for TiDB clusters running on
//! Kubernetes.
//!
//! ```no_run
//! use monitor_core::config::{RenderParameters, TlsFallbackPolicy};
//! use monitor_core::pattern::RelabelRegex;
//! use monitor_core::render::{ConfigRenderer, RenderContext};
//!
//! # fn main() -> monitor_core::error::MonitorResult<()> {
//! let renderer = ConfigRenderer::new(RenderContext::new(&TlsFallbackPolicy::default())?);
//! let params = RenderParameters::new(vec!["tidb".into()], RelabelRegex::new("basic")?)
//!     .with_alertmanager("alertmanager:9093");
//! let yaml = renderer.render(&params)?;
//! # let _ = yaml;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod pattern;
pub mod render;
