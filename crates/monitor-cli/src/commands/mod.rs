use clap::Subcommand;

pub mod dashboard;
pub mod render;
pub mod validate;

#[derive(Subcommand)]
pub enum Commands {
    /// Render prometheus.yml from a parameter file and/or flags
    Render(render::RenderArgs),
    /// Print the Grafana dashboard provisioning document
    Dashboard(dashboard::DashboardArgs),
    /// Validate a parameter file without writing anything
    Validate(validate::ValidateArgs),
}
