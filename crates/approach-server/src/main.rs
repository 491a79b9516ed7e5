//! Approach Server - serves simulation sessions over HTTP

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use approach_core::{load_roster, ReconciliationStatus, SimulationSession};
use approach_server::api;
use approach_server::config::Config;
use approach_server::state::{AppState, DEFAULT_SESSION_ID};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(config.log_json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!config.log_json).then(tracing_subscriber::fmt::layer))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("approach_server=debug".parse()?)
                .add_directive("approach_core=info".parse()?),
        )
        .init();

    tracing::info!("Starting Approach Server...");

    let session = build_default_session(&config)?;
    let port = config.server_port;
    let state = Arc::new(AppState::new(config));
    state.insert_session(DEFAULT_SESSION_ID, session);

    let app = api::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Load the startup roster; any invalid aircraft aborts startup.
fn build_default_session(config: &Config) -> Result<SimulationSession> {
    let aircraft = load_roster(&config.planes_file)
        .with_context(|| format!("loading roster {}", config.planes_file.display()))?;
    let mut session = SimulationSession::new(&aircraft, config.airport, config.rules())
        .context("deriving flight records")?;

    if config.reconcile {
        session = session.reconciled();
        if let ReconciliationStatus::Diverged {
            iterations,
            remaining_conflicts,
        } = session.reconciliation()
        {
            tracing::warn!(
                "Startup reconciliation diverged after {} scans ({} conflicting pairs left)",
                iterations,
                remaining_conflicts
            );
        }
        if config.require_convergence {
            session = session.require_converged()?;
        }
    }

    tracing::info!(
        "Default session ready: {} flights, horizon {:.1} min, {} adjustment(s)",
        session.flights().len(),
        session.horizon(),
        session.adjustments().len()
    );
    Ok(session)
}
