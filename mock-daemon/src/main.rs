use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8888".to_string());
    let addr = format!("127.0.0.1:{port}");
    let db = match (std::env::var("SYNC_LOGIN"), std::env::var("SYNC_PASSWORD")) {
        (Ok(login), Ok(password)) => mock_daemon::new_db_with_auth(&login, &password),
        _ => mock_daemon::new_db(),
    };
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "mock daemon listening");
    mock_daemon::run_with_state(listener, db).await
}
