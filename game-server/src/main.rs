use std::sync::Arc;

use tokio::signal;
use tracing::{error, info};

use game_core::{EligibilityGate, GameRng, GameRound};
use game_persistence::{SqlPlayLedger, connection::connect_and_migrate};
use game_server::{AppState, auth::AuthService, config::Config, create_routes};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting MagRuit server...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let addr = match config.host.parse::<std::net::IpAddr>() {
        Ok(ip) => (ip, config.port),
        Err(e) => {
            error!("Invalid HOST '{}': {}", config.host, e);
            std::process::exit(1);
        }
    };

    // Initialize database connection and run migrations
    let db = match connect_and_migrate(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database and run migrations: {}", e);
            std::process::exit(1);
        }
    };
    let ledger = Arc::new(SqlPlayLedger::new(db));

    let rng = GameRng::from_optional_seed(config.rng_seed);
    if let Some(seed) = rng.seed() {
        info!("Using fixed RNG seed {}", seed);
    }

    let game_round = match GameRound::new(ledger, EligibilityGate::local(), rng)
        .with_grid_size(config.grid_size)
    {
        Ok(round) => Arc::new(round),
        Err(e) => {
            error!("Invalid GRID_SIZE: {}", e);
            std::process::exit(1);
        }
    };

    let auth_service = if config.auth_dev_mode {
        info!("Starting in development authentication mode - token validation disabled");
        Arc::new(AuthService::new_dev_mode())
    } else {
        Arc::new(AuthService::new(config.firebase_project_id.clone()))
    };

    let routes = create_routes(AppState {
        game_round,
        auth_service,
        config: Arc::new(config),
    });

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, shutdown_signal());

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let sigint = signal::unix::signal(signal::unix::SignalKind::interrupt());
        let sigterm = signal::unix::signal(signal::unix::SignalKind::terminate());

        match (sigint, sigterm) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                tokio::select! {
                    _ = sigint.recv() => {
                        info!("Received SIGINT, shutting down gracefully...");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down gracefully...");
                    }
                }
                return;
            }
            (Err(e), _) | (_, Err(e)) => {
                error!("Failed to install signal handlers: {}", e);
            }
        }
    }

    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for ctrl+c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down gracefully...");
}
