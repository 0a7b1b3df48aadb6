//! Tenant Gate server entry point.
//!
//! ```text
//! tenant_gate [--env <name>] [--port <port>]
//! ```
//!
//! Loads `config/<env>.yaml` (default `dev`), applies `TENANT_GATE_*`
//! environment overrides and serves the internal API.

use tenant_gate::{config::AppConfig, gateway, logging};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env)?;
    let _log_guard = logging::init_logging(&app_config);

    tracing::info!("Starting Tenant Gate in {} mode", env);

    gateway::run_server(&app_config, get_port_override()).await
}
