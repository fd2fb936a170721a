use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use utoipa::ToSchema;

use davbox_core::AppError;

use crate::auth::session;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Establish an operator session.
#[utoipa::path(
    post,
    path = "/api/v0/session",
    tag = "session",
    request_body = LoginRequest,
    responses(
        (status = 204, description = "Session established"),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, jar, body), fields(operation = "login"))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !session::credentials_match(&state.config, &body.username, &body.password) {
        tracing::info!("Operator login rejected");
        return Err(AppError::Unauthorized("Invalid credentials".to_string()).into());
    }

    let token = session::issue_session(&state.config)?;
    let jar = jar.add(session::session_cookie(token, &state.config));
    tracing::info!("Operator logged in");
    Ok((jar, StatusCode::NO_CONTENT))
}

/// Clear the operator session.
#[utoipa::path(
    delete,
    path = "/api/v0/session",
    tag = "session",
    responses((status = 204, description = "Session cleared"))
)]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.add(session::clear_session_cookie()),
        StatusCode::NO_CONTENT,
    )
}
