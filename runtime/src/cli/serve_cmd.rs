//! `roster-scout serve`: run the REST API.

use crate::cli::output::{self, Styled};
use crate::config::ScoutConfig;
use crate::rest::{self, AppState};
use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

/// Run the serve command until ctrl-c.
pub async fn run(host: &str, port: u16) -> Result<()> {
    let ip: IpAddr = host
        .parse()
        .with_context(|| format!("invalid listen address {host:?}"))?;
    let addr = SocketAddr::new(ip, port);

    let config = ScoutConfig::load()?;
    if !output::is_quiet() && !output::is_json() {
        let s = Styled::new();
        eprintln!(
            "  {} Roster Scout API v{} on http://{addr}",
            s.ok_sym(),
            config.app_version
        );
    }

    let state = Arc::new(AppState::from_config(config));
    rest::start(addr, state).await
}
