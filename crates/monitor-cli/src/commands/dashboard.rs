use std::path::PathBuf;

use clap::Args;

use monitor_core::dashboard::DASHBOARD_PROVISIONING;

use crate::output::write_document;

#[derive(Args)]
pub struct DashboardArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn execute(args: DashboardArgs) -> anyhow::Result<()> {
    write_document(args.output.as_deref(), DASHBOARD_PROVISIONING)?;
    Ok(())
}
