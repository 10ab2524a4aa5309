use crate::api::{self, Ledger, Mode, UserNames};
use crate::commands::Out;
use crate::server::{self, App};
use crate::{Config, Result};
use anyhow::Context;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Handles the `ledger serve` command: listens on `listen` for LINE webhook calls until
/// `shutdown` completes. Messages are answered through the LINE Messaging API in `Mode::Google`
/// and only logged in `Mode::Testing`.
///
/// # Errors
/// - Returns an error if the address cannot be bound or a collaborator cannot be constructed.
pub async fn serve(
    config: Config,
    mode: Mode,
    listen: SocketAddr,
    shutdown: impl Future<Output = ()>,
) -> Result<Out<()>> {
    let ledger = Ledger::new(api::sheet(&config, mode).await?);
    let users = UserNames::load(config.user_names_path()).await?;
    let messenger = api::messenger(&config, mode).await?;
    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("Unable to listen on {listen}"))?;
    info!("Serving the ledger kept in {} in {mode} mode", config.sheet_url());
    server::serve(listener, App::new(ledger, users, messenger), shutdown).await?;
    Ok("The webhook server has stopped".into())
}

/// Resolves when the process receives ctrl-c.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Unable to listen for ctrl-c, the server will stop now: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let env = TestEnv::new().await;
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let out = serve(env.config(), Mode::Testing, addr, async {})
            .await
            .unwrap();
        assert!(out.message().contains("stopped"));
    }
}
