mod chat;
mod composer;
mod config;
mod errors;
mod greeting;
mod llm_client;
mod models;
mod referrals;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{ChatModel, LlmClient};
use crate::referrals::resolver::CookiePolicy;
use crate::referrals::RefStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Gluks API v{}", env!("CARGO_PKG_VERSION"));

    // Referral data is read once and never mutated afterwards
    let store = RefStore::load(&config.default_data_path, &config.refs_data_path)?;
    if store.is_empty() {
        warn!("No referral records loaded; every visitor gets the default agent");
    }

    let cookie_policy = CookiePolicy::new(config.ref_cookie_max_age, config.is_production());
    info!(
        "Ref cookie policy: max-age {}s, secure={}",
        cookie_policy.max_age.as_secs(),
        cookie_policy.secure
    );

    let chat: Option<Arc<dyn ChatModel>> = match &config.anthropic_api_key {
        Some(key) => {
            let client = LlmClient::new(key.clone())?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(Arc::new(client) as Arc<dyn ChatModel>)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; /api/chat is disabled");
            None
        }
    };

    let state = AppState {
        store: Arc::new(store),
        cookie_policy,
        chat,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    match &config.public_base_url {
        Some(url) => info!("Listening on {addr} (public URL {url})"),
        None => info!("Listening on {addr}"),
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
