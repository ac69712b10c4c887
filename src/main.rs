use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use lead_funnel::config::FunnelConfig;
use lead_funnel::form::{FormRouteState, FormSessions, form_routes};
use lead_funnel::store::{DraftStore, LibSqlDraftStore, MemoryDraftStore};
use lead_funnel::submission::{HttpLeadSink, LeadSink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = FunnelConfig::from_env().context("Invalid configuration")?;

    eprintln!("💶 Lead funnel v{}", env!("CARGO_PKG_VERSION"));
    let addr = SocketAddr::new(config.bind_addr, config.port);
    eprintln!("   Wizard API: http://{addr}/api/form");
    eprintln!("   Pensionato leads → {}", config.submission.pensionato_endpoint);
    eprintln!("   Dipendente leads → {}", config.submission.dipendente_endpoint);

    // ── Drafts ───────────────────────────────────────────────────────────
    let drafts: Arc<dyn DraftStore> = match &config.db_path {
        Some(path) => Arc::new(
            LibSqlDraftStore::new_local(path)
                .await
                .with_context(|| format!("Failed to open draft database at {}", path.display()))?,
        ),
        None => {
            tracing::info!("FUNNEL_DB_PATH not set, keeping drafts in memory");
            Arc::new(MemoryDraftStore::new())
        }
    };

    let sink: Arc<dyn LeadSink> = Arc::new(HttpLeadSink::new(config.submission.clone())?);
    let sessions = Arc::new(FormSessions::new(config.form.clone(), drafts, sink));

    let origin = if config.allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        let origins = config
            .allowed_origins
            .iter()
            .map(|o| HeaderValue::from_str(o))
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid origin in FUNNEL_ALLOWED_ORIGINS")?;
        AllowOrigin::list(origins)
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = form_routes(FormRouteState { sessions }).layer(cors);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "Lead funnel server started");
    axum::serve(listener, app).await?;

    Ok(())
}
