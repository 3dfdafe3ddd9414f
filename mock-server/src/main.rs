use mock_server::ListShape;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    init_tracing();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let shape = match std::env::var("LIST_SHAPE").as_deref() {
        Ok("bare") => ListShape::Bare,
        Ok("unrecognized") => ListShape::Unrecognized,
        Ok("envelope") | Err(_) => ListShape::Envelope,
        Ok(other) => {
            warn!(shape = other, "unknown LIST_SHAPE, using envelope");
            ListShape::Envelope
        }
    };

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, ?shape, "listening");
    mock_server::run_with(listener, shape).await
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
