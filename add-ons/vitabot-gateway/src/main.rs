//! Gateway entrypoint: config, tracing, background sweeps, axum server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use vitabot_core::{provider_from_config, BotConfig, LeadMailer, SessionStore};
use vitabot_gateway::{build_app, AppState, RateLimiter};

const RATE_WINDOW: Duration = Duration::from_secs(60);
const PER_IP_LIMIT: u32 = 60;
const PER_CLIENT_LIMIT: u32 = 120;
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    if dotenvy::dotenv().is_err() {
        eprintln!("[vitabot-gateway] no .env file, using process environment");
    }

    let file_appender = tracing_appender::rolling::daily("logs", "chatbot.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    let config = Arc::new(BotConfig::from_env());

    let provider = provider_from_config(&config);
    match &provider {
        Some(provider) => tracing::info!(
            source = provider.source().as_str(),
            model = provider.model(),
            "model provider configured"
        ),
        None => tracing::info!("no API keys set, running in demo mode with canned replies"),
    }

    let store = Arc::new(SessionStore::new());
    if let Some(ttl) = config.session_ttl {
        let sweep_store = Arc::clone(&store);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                ticker.tick().await;
                let evicted = sweep_store.sweep_idle(ttl);
                if evicted > 0 {
                    tracing::info!(evicted, "idle sessions evicted");
                }
            }
        });
    }

    let mailer = LeadMailer::from_config(&config).map(Arc::new);
    if mailer.is_none() && config.leads_email_to.is_some() {
        tracing::warn!("LEADS_EMAIL_TO is set but SMTP is incomplete, leads will only be logged");
    }

    let state = AppState {
        config: Arc::clone(&config),
        store,
        provider,
        mailer,
        limiter: Arc::new(RateLimiter::new(RATE_WINDOW, PER_IP_LIMIT, PER_CLIENT_LIMIT)),
        started_at: Instant::now(),
    };
    let app = build_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, %addr, "failed to bind listener");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "vitabot gateway listening");

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );

    tokio::select! {
        result = server => {
            if let Err(error) = result {
                tracing::error!(%error, "server error");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown requested (Ctrl+C)");
        }
    }
}
