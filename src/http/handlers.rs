//! Session-server API handlers.

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::http::server::AppState;
use crate::observability::metrics::{self, Outcome, RequestInfo};
use crate::yggdrasil::MAX_PROFILE_BATCH;

const APPLICATION_JSON: &str = "application/json";

/// Query parameters of `/hasJoined`. Absent parameters bind as empty strings
/// and are forwarded as such.
#[derive(Debug, Deserialize)]
pub struct HasJoinedParams {
    #[serde(default)]
    pub username: String,
    #[serde(default, rename = "serverId")]
    pub server_id: String,
}

/// `GET /`. Servers running authlib-injector call this on boot.
pub async fn index() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, APPLICATION_JSON)], "{}")
}

/// `GET /sessionserver/session/minecraft/hasJoined`.
pub async fn has_joined(
    State(state): State<AppState>,
    params: Result<Query<HasJoinedParams>, QueryRejection>,
) -> Response {
    let start_time = Instant::now();

    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Malformed hasJoined query");
            metrics::record_has_joined(
                &RequestInfo {
                    username: "",
                    server_id: "",
                    outcome: Outcome::Failed,
                },
                start_time,
            );
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let result = match state
        .provider
        .has_joined(&params.username, &params.server_id)
        .await
    {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(
                username = %params.username,
                server_id = %params.server_id,
                error = %e,
                "Failed to serve hasJoined request"
            );
            metrics::record_has_joined(
                &RequestInfo {
                    username: &params.username,
                    server_id: &params.server_id,
                    outcome: Outcome::Failed,
                },
                start_time,
            );
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let joined = result.is_joined();
    tracing::info!(
        username = %params.username,
        server_id = %params.server_id,
        upstream = %result.upstream(),
        has_joined = joined,
        "Served hasJoined request"
    );
    metrics::record_has_joined(
        &RequestInfo {
            username: &params.username,
            server_id: &params.server_id,
            outcome: if joined {
                Outcome::LoggedIn
            } else {
                Outcome::NotLoggedIn
            },
        },
        start_time,
    );

    if joined {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, APPLICATION_JSON)],
            result.into_raw_body(),
        )
            .into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

/// `POST /api/profiles/minecraft`.
pub async fn get_profiles(
    State(state): State<AppState>,
    payload: Result<Json<Vec<String>>, JsonRejection>,
) -> Response {
    let usernames = match payload {
        Ok(Json(usernames)) => usernames,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Malformed profiles request body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    if usernames.len() > MAX_PROFILE_BATCH {
        tracing::warn!(
            count = usernames.len(),
            limit = MAX_PROFILE_BATCH,
            "Too many usernames in profiles request"
        );
        return StatusCode::BAD_REQUEST.into_response();
    }

    match state.provider.get_profiles(&usernames).await {
        Ok(profiles) => {
            tracing::info!(
                requested = usernames.len(),
                found = profiles.len(),
                "Served profiles request"
            );
            Json(profiles).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serve profiles request");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
