use std::io::Write;
use std::path::Path;

use monitor_core::error::{MonitorError, MonitorResult};

/// Write to `path`, or to stdout when no path is given.
pub fn write_document(path: Option<&Path>, content: &str) -> MonitorResult<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content).map_err(|source| MonitorError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            tracing::info!(path = %path.display(), bytes = content.len(), "Wrote document");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .and_then(|_| stdout.flush())
                .map_err(|source| MonitorError::Io {
                    path: "<stdout>".into(),
                    source,
                })?;
        }
    }
    Ok(())
}
