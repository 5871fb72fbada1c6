use std::net::SocketAddr;
use std::sync::Arc;

use pairs::config::{self, Settings};
use pairs::http::routes::{self, AppState};
use pairs::room::Room;
use pairs::source::CsvImageSource;
use pairs::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let settings = Settings::from_env();
    let location = config::image_source();
    tracing::info!(source = %location, reveal_delay_ms = settings.reveal_delay.as_millis() as u64, "configured");

    let source = Arc::new(CsvImageSource::from_location(&location));
    let state = AppState { room: Room::new(source, settings) };
    let app = routes::router(state);

    let addr: SocketAddr = config::server_addr();
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
