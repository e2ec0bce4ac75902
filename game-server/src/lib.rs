use std::sync::Arc;

use chrono::{Local, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use warp::Filter;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};

use crate::auth::AuthService;
use crate::config::Config;
use game_core::{GameRound, PlayError, RecordStore, build_admin_report, summarize};
use game_persistence::SqlPlayLedger;
use game_types::{ApiError, GameError, Player, ProfileResponse, UserProfile};

pub mod auth;
pub mod config;

pub type SharedGameRound = Arc<GameRound<SqlPlayLedger>>;

#[derive(Clone)]
pub struct AppState {
    pub game_round: SharedGameRound,
    pub auth_service: Arc<AuthService>,
    pub config: Arc<Config>,
}

pub fn create_routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let state_filter = warp::any().map(move || state.clone());
    let auth_header = warp::header::optional::<String>("authorization");

    // Health check endpoint
    let health = warp::path!("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    let play_status = warp::path!("play" / "status")
        .and(warp::get())
        .and(auth_header)
        .and(state_filter.clone())
        .and_then(handle_play_status_request);

    let play = warp::path!("play")
        .and(warp::post())
        .and(auth_header)
        .and(state_filter.clone())
        .and_then(handle_play_request);

    let profile = warp::path!("profile")
        .and(warp::get())
        .and(auth_header)
        .and(state_filter.clone())
        .and_then(handle_profile_request);

    let admin_report = warp::path!("admin" / "report")
        .and(warp::get())
        .and(auth_header)
        .and(state_filter)
        .and_then(handle_admin_report_request);

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "authorization"])
        .allow_methods(vec!["GET", "POST"]);

    health
        .or(play_status)
        .or(play)
        .or(profile)
        .or(admin_report)
        .with(cors)
        .with(warp::log("magruit"))
}

fn json_reply<T: Serialize>(body: &T, status: StatusCode) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(body), status)
}

fn error_reply(status: StatusCode, error: GameError) -> WithStatus<Json> {
    json_reply(&ApiError::from(error), status)
}

fn internal_error(context: &str, err: impl std::fmt::Display) -> WithStatus<Json> {
    error!("{}: {}", context, err);
    error_reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        GameError::InternalError {
            message: context.to_string(),
        },
    )
}

/// Resolve the caller from the bearer token and touch their profile.
///
/// The profile is created on first contact. Configured admin emails are
/// promoted here as well.
async fn authenticate(
    auth_header: Option<String>,
    state: &AppState,
) -> Result<(Player, UserProfile), WithStatus<Json>> {
    let Some(auth_header) = auth_header else {
        return Err(error_reply(
            StatusCode::UNAUTHORIZED,
            GameError::AuthenticationRequired,
        ));
    };
    let token = auth_header.strip_prefix("Bearer ").unwrap_or(&auth_header);

    let player = state
        .auth_service
        .validate_token(token)
        .await
        .map_err(|err| {
            warn!("Rejected token: {}", err);
            error_reply(StatusCode::UNAUTHORIZED, GameError::InvalidToken)
        })?;

    let users = state.game_round.ledger().users();
    let mut profile = users
        .ensure_profile(&player.uid, &player.email)
        .await
        .map_err(|err| internal_error("Failed to load profile", err))?;

    if !profile.is_admin && state.config.is_admin_email(&player.email) {
        users
            .set_admin(&player.uid, true)
            .await
            .map_err(|err| internal_error("Failed to promote admin", err))?;
        profile.is_admin = true;
        info!("Promoted user {} to admin", player.uid);
    }

    Ok((player, profile))
}

async fn handle_play_status_request(
    auth_header: Option<String>,
    state: AppState,
) -> Result<WithStatus<Json>, warp::Rejection> {
    let (player, _) = match authenticate(auth_header, &state).await {
        Ok(caller) => caller,
        Err(reply) => return Ok(reply),
    };

    match state.game_round.status(&player, Utc::now()).await {
        Ok(status) => Ok(json_reply(&status, StatusCode::OK)),
        Err(err) => Ok(internal_error("Failed to read play status", err)),
    }
}

async fn handle_play_request(
    auth_header: Option<String>,
    state: AppState,
) -> Result<WithStatus<Json>, warp::Rejection> {
    let (player, _) = match authenticate(auth_header, &state).await {
        Ok(caller) => caller,
        Err(reply) => return Ok(reply),
    };

    match state.game_round.play(&player).await {
        Ok(outcome) => Ok(json_reply(&outcome, StatusCode::OK)),
        Err(err @ PlayError::AlreadyPlayed) => {
            Ok(error_reply(StatusCode::CONFLICT, GameError::from(&err)))
        }
        Err(err) => {
            error!("Play failed for user {}: {}", player.uid, err);
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                GameError::from(&err),
            ))
        }
    }
}

async fn handle_profile_request(
    auth_header: Option<String>,
    state: AppState,
) -> Result<WithStatus<Json>, warp::Rejection> {
    let (player, profile) = match authenticate(auth_header, &state).await {
        Ok(caller) => caller,
        Err(reply) => return Ok(reply),
    };

    let history = match state
        .game_round
        .ledger()
        .records()
        .find_by_user(&player.uid)
        .await
    {
        Ok(history) => history,
        Err(err) => return Ok(internal_error("Failed to fetch play history", err)),
    };

    let summary = summarize(&history);
    let response = ProfileResponse {
        profile,
        history,
        total_plays: summary.total_plays,
        total_wins: summary.total_wins,
    };
    Ok(json_reply(&response, StatusCode::OK))
}

async fn handle_admin_report_request(
    auth_header: Option<String>,
    state: AppState,
) -> Result<WithStatus<Json>, warp::Rejection> {
    let (player, profile) = match authenticate(auth_header, &state).await {
        Ok(caller) => caller,
        Err(reply) => return Ok(reply),
    };

    if !profile.is_admin {
        warn!("User {} requested the admin report", player.uid);
        return Ok(error_reply(StatusCode::FORBIDDEN, GameError::NotAuthorized));
    }

    match state.game_round.ledger().query_all().await {
        Ok(records) => Ok(json_reply(
            &build_admin_report(records, &Local),
            StatusCode::OK,
        )),
        Err(err) => Ok(internal_error("Failed to fetch play records", err)),
    }
}
