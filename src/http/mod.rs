//! Dashboard HTTP server.
//!
//! Serves the upload form, the analysis result page, the research data
//! viewer and JSON equivalents of the latter two. Analysis runs on the
//! blocking pool so large uploads never stall the executor.

mod routes;

pub use routes::{build_router, run_http_server, DashboardState, HealthResponse, HttpServerError};

use std::net::SocketAddr;

use log::info;

use crate::config::AppConfig;

/// Build a runtime and serve the dashboard until Ctrl-C.
pub fn run_dashboard(config: AppConfig, addr: SocketAddr) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    info!("[HTTP] Dashboard listening on http://{}", addr);

    runtime.block_on(async move {
        let state = DashboardState::new(config);
        run_http_server(state, addr).await
    })
}
