use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::Config;
use crate::http::connection::{Connection, ConnectionLimits};
use crate::router::Router;

/// Binds the configured address and serves until the process is stopped.
pub async fn run(cfg: &Config, router: Router) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.server.listen_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    serve(listener, router, cfg.limits()).await
}

/// Serves connections from an already bound listener.
///
/// Every connection runs as its own task. On a current-thread runtime those
/// tasks interleave only at I/O points, so handlers never run in parallel.
/// Accept errors are logged and the loop keeps going.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    limits: ConnectionLimits,
) -> anyhow::Result<()> {
    let router = Arc::new(router);

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let router = Arc::clone(&router);
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, peer, router, limits);
            if let Err(e) = conn.run().await {
                error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
