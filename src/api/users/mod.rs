//! Account endpoints under `/api/v1/user`
//!
//! Registration, sessions, profile editing and password recovery. Session
//! responses carry the token in the body and in a `token` cookie.

mod form;

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        Path, State,
    },
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::User;
use crate::infrastructure::auth::SessionCookie;
use crate::infrastructure::user::{PasswordChange, SessionGrant};

use form::ProfileForm;

/// Create the account router
pub fn create_user_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/me", get(get_me).put(update_me))
        .route("/password", put(update_password))
        .route("/portfolio-user", get(get_portfolio_user))
        .route("/password/forgot", post(forgot_password))
        .route("/password/reset/{token}", put(reset_password))
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[hidden]")
            .finish()
    }
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub password: String,
    pub confirm_password: String,
}

/// Body of every response that opens a session
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub message: String,
    pub user: User,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct ProfileUpdatedResponse {
    pub success: bool,
    pub message: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

fn set_cookie(cookie: &SessionCookie) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(&cookie.header_value())
        .map_err(|_| ApiError::internal("Failed to build session cookie"))
}

fn session_response(
    status: StatusCode,
    message: &str,
    grant: SessionGrant,
) -> Result<Response, ApiError> {
    let cookie = set_cookie(&grant.session.cookie)?;
    let body = SessionResponse {
        success: true,
        message: message.to_string(),
        user: grant.user,
        token: grant.session.token,
    };

    Ok((status, [(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// POST /api/v1/user/register
pub async fn register(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let (registration, files) = ProfileForm::read(multipart).await?.into_registration();
    debug!(email = %registration.email, "Registering account");

    let grant = state.account_service.register(registration, files).await?;

    session_response(StatusCode::CREATED, "User Registered!", grant)
}

/// POST /api/v1/user/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let grant = state
        .account_service
        .login(&request.email, &request.password)
        .await?;

    session_response(StatusCode::OK, "Logged In", grant)
}

/// GET /api/v1/user/logout
pub async fn logout(State(state): State<AppState>) -> Result<Response, ApiError> {
    let cookie = set_cookie(&state.account_service.logout())?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse::ok("Logged Out")),
    )
        .into_response())
}

/// GET /api/v1/user/me
pub async fn get_me(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.account_service.get_user(user.id()).await?;

    Ok(Json(UserResponse {
        success: true,
        user,
    }))
}

/// PUT /api/v1/user/me
pub async fn update_me(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ProfileUpdatedResponse>, ApiError> {
    let (update, files) = ProfileForm::read(multipart).await?.into_profile_update();

    let user = state
        .account_service
        .update_profile(user.id(), update, files)
        .await?;

    Ok(Json(ProfileUpdatedResponse {
        success: true,
        message: "Profile Updated!".to_string(),
        user,
    }))
}

/// PUT /api/v1/user/password
pub async fn update_password(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let change = PasswordChange {
        current_password: request.current_password,
        new_password: request.new_password,
        confirm_new_password: request.confirm_new_password,
    };

    state
        .account_service
        .update_password(user.id(), change)
        .await?;

    Ok(Json(MessageResponse::ok("Password Updated!")))
}

/// GET /api/v1/user/portfolio-user
pub async fn get_portfolio_user(
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.account_service.get_user_for_portfolio().await?;

    Ok(Json(UserResponse {
        success: true,
        user,
    }))
}

/// POST /api/v1/user/password/forgot
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = request.email.trim();
    state.account_service.forgot_password(email).await?;

    Ok(Json(MessageResponse::ok(format!(
        "Email sent to {} successfully!",
        email
    ))))
}

/// PUT /api/v1/user/password/reset/{token}
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Response, ApiError> {
    let grant = state
        .account_service
        .reset_password(&token, &request.password, &request.confirm_password)
        .await?;

    session_response(StatusCode::OK, "Reset password successfully!", grant)
}
