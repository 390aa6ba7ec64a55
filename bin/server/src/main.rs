use chatrelay_ai::{CompletionEngine, OpenAiEngine};
use chatrelay_channel::MessagingChannel;
use chatrelay_channel::line::LineClient;
use chatrelay_relay::RelayOrchestrator;
use chatrelay_server::{AppState, ServerConfig, router};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    let relay_config = config.relay_config();
    let store = relay_config
        .session_store()
        .expect("invalid relay configuration");
    tracing::info!(
        max_history_length = relay_config.max_history_length,
        expiration_time = relay_config.expiration_time,
        max_chunk_length = relay_config.max_chunk_length,
        "Loaded configuration"
    );

    let engine: Arc<dyn CompletionEngine> = Arc::new(
        OpenAiEngine::new(config.openai_config()).expect("failed to build completion engine"),
    );
    let channel: Arc<dyn MessagingChannel> =
        Arc::new(LineClient::new(config.line_config()).expect("failed to build LINE client"));
    tracing::info!(model = engine.model(), channel = channel.name(), "relay ready");

    let relay = RelayOrchestrator::new(store, engine, channel, &relay_config);
    let app = router(Arc::new(AppState::new(relay, config.line_secret.clone())));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server stopped, in-memory sessions discarded");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
