//! HTTP Handlers

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, FromRequestParts, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::Instrument;

use platform::client::extract_client_ip;
use platform::password::CredentialHasher;
use platform::token::TokenService;

use crate::application::config::AuthConfig;
use crate::application::{
    CurrentUserUseCase, LoginInput, LoginUseCase, RefreshUseCase, RegisterInput, RegisterUseCase,
};
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult, FieldError};
use crate::presentation::dto::{
    LoginRequest, LoginResponse, MeResponse, RefreshRequest, RefreshResponse, RegisterRequest,
    RegisterResponse, TOKEN_TYPE,
};
use crate::presentation::middleware::AuthContext;

/// Shared state for auth handlers
///
/// Everything except the repository is read-only after construction.
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub hasher: Arc<CredentialHasher>,
    pub tokens: Arc<TokenService>,
}

impl<R> AuthAppState<R>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    /// Build the hasher (including its dummy hash) and token service once
    pub fn new(repo: R, config: AuthConfig) -> AuthResult<Self> {
        Ok(Self {
            repo: Arc::new(repo),
            hasher: Arc::new(CredentialHasher::new(config.hasher)?),
            tokens: Arc::new(TokenService::new(config.token)),
        })
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/users/register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AuthResult<(StatusCode, Json<RegisterResponse>)>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let req = json_body(payload)?;

    let use_case = RegisterUseCase::new(state.repo.clone(), state.hasher.clone());

    let input = RegisterInput {
        email: req.email,
        user_name: req.username,
        password: req.password,
    };

    let output = use_case.execute(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: output.user_id.to_string(),
            username: output.user_name.to_string(),
            email: output.email.to_string(),
        }),
    ))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/users/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    ClientIp(client_ip): ClientIp,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AuthResult<Json<LoginResponse>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let req = json_body(payload)?;

    let use_case = LoginUseCase::new(
        state.repo.clone(),
        state.hasher.clone(),
        state.tokens.clone(),
    );

    let input = LoginInput {
        email: req.email,
        password: req.password,
    };

    let output = use_case
        .execute(input)
        .instrument(tracing::info_span!("login", client_ip = ?client_ip))
        .await?;

    Ok(Json(LoginResponse {
        id: output.user.user_id.to_string(),
        username: output.user.user_name.to_string(),
        email: output.user.email.to_string(),
        token: output.access_token,
        refresh_token: output.refresh_token,
        token_type: TOKEN_TYPE,
        expires_in: output.expires_in,
    }))
}

// ============================================================================
// Refresh
// ============================================================================

/// POST /api/users/refresh
pub async fn refresh<R>(
    State(state): State<AuthAppState<R>>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> AuthResult<Json<RefreshResponse>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let req = json_body(payload)?;

    let use_case = RefreshUseCase::new(state.repo.clone(), state.tokens.clone());
    let output = use_case.execute(req.refresh_token).await?;

    Ok(Json(RefreshResponse {
        token: output.access_token,
        token_type: TOKEN_TYPE,
        expires_in: output.expires_in,
    }))
}

// ============================================================================
// Current User (requires authentication)
// ============================================================================

/// GET /api/users/me
pub async fn me<R>(
    State(state): State<AuthAppState<R>>,
    context: AuthContext,
) -> AuthResult<Json<MeResponse>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = CurrentUserUseCase::new(state.repo.clone());
    let user = use_case.execute(&context.user_id).await?;

    Ok(Json(MeResponse {
        id: user.user_id.to_string(),
        username: user.user_name.to_string(),
        email: user.email.to_string(),
        role: user.user_role.to_string(),
    }))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Best-effort client address, for logs only
pub struct ClientIp(pub Option<IpAddr>);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let direct = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip());

        Ok(ClientIp(extract_client_ip(&parts.headers, direct)))
    }
}

/// Unreadable bodies are reported like any other validation failure
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AuthResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AuthError::Validation(vec![FieldError::new("body", rejection.body_text())]))
}
