//! PingIQ standalone server.
//!
//! - Config: `$PINGIQ_CONFIG` or `./pingiq.yaml`, defaults when absent;
//!   `$PINGIQ_LISTEN` overrides the listen address
//! - Serves every endpoint under `base_path`
//! - SIGTERM/SIGINT: readiness fails, drain delay, then stop serving

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use pingiq_gateway::{
    config,
    hooks::TracingHooks,
    lifecycle::ShutdownOptions,
    router, PingIq,
};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = config::load_from_env().expect("config load failed");

    let listen: SocketAddr = cfg
        .server
        .listen
        .parse()
        .expect("server.listen must be a valid SocketAddr");
    let shutdown_opts = ShutdownOptions::from_config(&cfg.shutdown)
        .expect("invalid shutdown config")
        .with_exit_process(false);

    let app = PingIq::builder(cfg)
        .logging(TracingHooks)
        .build()
        .expect("pingiq init failed");
    let shutdown = app
        .install_graceful_shutdown(shutdown_opts)
        .expect("signal handler install failed");

    let router = router::build_router(app);

    tracing::info!(%listen, "pingiq-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown.drained())
    .await
    .expect("server failed");

    tracing::info!("pingiq-gateway stopped");
}
