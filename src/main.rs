mod app;
mod core;
mod features;
mod shared;

use crate::core::config::Config;
use crate::core::database;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Worker count from TOKIO_WORKER_THREADS, else one per CPU
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(run(worker_threads))
}

async fn run(worker_threads: usize) -> anyhow::Result<()> {
    // .env must be loaded before the subscriber reads RUST_LOG
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        "Configuration loaded: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Opened expense store at {}", config.database.url);

    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Schema is up to date");

    let app = app::build_router(&config, pool);

    let addr = config.app.server_address();
    let listener = bind_listener(&addr)?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn bind_listener(addr: &str) -> anyhow::Result<tokio::net::TcpListener> {
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address {}: {}", addr, e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;
    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;
    socket.set_tcp_keepalive(
        &socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60)),
    )?;
    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    Ok(tokio::net::TcpListener::from_std(socket.into())?)
}
