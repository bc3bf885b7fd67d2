use anyhow::Result;
use viva_core::session::SessionManager;
use viva_core::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let manager = SessionManager::new();
    manager.run().await
}
