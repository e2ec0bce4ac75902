use std::sync::Arc;

use game_core::{EligibilityGate, GameRng, GameRound, GridGenerator};
use game_persistence::{SqlPlayLedger, connection::connect_to_memory_database};
use game_server::{AppState, auth::AuthService, config::Config, create_routes};
use game_types::Symbol;
use migration::{Migrator, MigratorTrait};
use warp::Filter;

pub const ADMIN_EMAIL: &str = "admin@example.com";

/// Dev-mode bearer header for the given uid.
pub fn bearer(uid: &str) -> String {
    format!("Bearer {}:{}@example.com", uid, uid)
}

pub fn admin_bearer() -> String {
    format!("Bearer root:{}", ADMIN_EMAIL)
}

async fn create_state(generator: Option<GridGenerator>) -> AppState {
    let db = connect_to_memory_database().await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    let ledger = Arc::new(SqlPlayLedger::new(db));

    let mut round = GameRound::new(ledger, EligibilityGate::local(), GameRng::new(7));
    if let Some(generator) = generator {
        round = round.with_generator(generator);
    }

    let config = Config {
        auth_dev_mode: true,
        rng_seed: Some(7),
        admin_emails: vec![ADMIN_EMAIL.to_string()],
        ..Config::default()
    };

    AppState {
        game_round: Arc::new(round),
        auth_service: Arc::new(AuthService::new_dev_mode()),
        config: Arc::new(config),
    }
}

/// Routes over a fresh in-memory database with dev-mode auth.
pub async fn create_test_app()
-> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    create_routes(create_state(None).await)
}

/// Routes whose grids are always a single symbol, so every play wins.
pub async fn create_winning_test_app()
-> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let generator = GridGenerator::new(vec![Symbol::Kiwi]).unwrap();
    create_routes(create_state(Some(generator)).await)
}
