//! Authentication endpoints: login, logout, session restore and password
//! change.
//!
//! Login is restricted to portal roles (`sindico`, `porteiro`). Unknown
//! emails, wrong passwords, inactive accounts and resident accounts all
//! answer with the same generic 401 so credentials cannot be probed.

use crate::{
    AppState,
    api::models::{
        auth::{AuthResponse, AuthSuccessResponse, ChangePasswordRequest, LoginRequest, LoginResponse, LogoutResponse, SessionResponse},
        users::{CurrentUser, ResidentResponse, ResidentStatus},
    },
    auth::{
        password::{self, Argon2Params},
        permissions::reachable_sections,
        session,
    },
    config::Config,
    db::{
        handlers::{repository::Repository, users::Users},
        models::users::UserUpdateDBRequest,
    },
    errors::{Error, Result},
};
use axum::{Json, extract::State};

fn invalid_credentials() -> Error {
    Error::Unauthenticated {
        message: Some("Invalid email or password".to_string()),
    }
}

fn validate_password_length(password: &str, config: &Config) -> Result<()> {
    let password_config = &config.auth.native.password;
    if password.len() < password_config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", password_config.min_length),
        });
    }
    if password.len() > password_config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", password_config.max_length),
        });
    }
    Ok(())
}

/// Hash a password on the blocking pool with the configured Argon2 cost.
pub(crate) async fn hash_password(password: String, config: &Config) -> Result<String> {
    let password_config = &config.auth.native.password;
    let params = Argon2Params {
        memory_kib: password_config.argon2_memory_kib,
        iterations: password_config.argon2_iterations,
        parallelism: password_config.argon2_parallelism,
    };

    tokio::task::spawn_blocking(move || password::hash_string_with_params(&password, Some(params)))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })?
}

async fn verify_password(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || password::verify_string(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })?
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/authentication/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<LoginResponse> {
    if !state.config.auth.native.enabled {
        return Err(Error::BadRequest {
            message: "Native authentication is disabled".to_string(),
        });
    }

    // Validated before any lookup
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(Error::BadRequest {
            message: "Email and password are required".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let user = users.get_by_email(&request.email).await?.ok_or_else(invalid_credentials)?;

    // Residents exist in the data model but have no portal login
    if !user.role.has_portal_access() || user.status == ResidentStatus::Inativo {
        return Err(invalid_credentials());
    }

    let is_valid = verify_password(request.password.clone(), user.password_hash.clone()).await?;
    if !is_valid {
        return Err(invalid_credentials());
    }

    let current_user = CurrentUser::from(user.clone());
    let token = session::create_session_token(&current_user, &state.config)?;
    let cookie = session::create_session_cookie(&token, &state.config);

    Ok(LoginResponse {
        auth_response: AuthResponse {
            sections: reachable_sections(user.role),
            user: ResidentResponse::from(user),
            message: "Login successful".to_string(),
        },
        cookie,
    })
}

/// Logout and clear the session cookie
#[utoipa::path(
    post,
    path = "/authentication/logout",
    tag = "authentication",
    responses(
        (status = 200, description = "Logged out", body = AuthSuccessResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> LogoutResponse {
    // Idempotent: clearing an absent cookie is still a successful logout
    LogoutResponse {
        auth_response: AuthSuccessResponse {
            message: "Logged out".to_string(),
        },
        cookie: session::expired_session_cookie(&state.config),
    }
}

/// Restore the session from the cookie
#[utoipa::path(
    get,
    path = "/authentication/session",
    tag = "authentication",
    responses(
        (status = 200, description = "Session is valid", body = SessionResponse),
        (status = 401, description = "No valid session"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_session(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<SessionResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    // Re-read the row so deactivation takes effect before the token expires;
    // a dead session also gets its cookie cleared
    let user = users.get_by_id(current_user.id).await?.ok_or_else(|| Error::SessionExpired {
        cookie: session::expired_session_cookie(&state.config),
    })?;
    if user.status == ResidentStatus::Inativo || !user.role.has_portal_access() {
        return Err(Error::SessionExpired {
            cookie: session::expired_session_cookie(&state.config),
        });
    }

    Ok(Json(SessionResponse {
        sections: reachable_sections(user.role),
        user: ResidentResponse::from(user),
    }))
}

/// Change password for the authenticated user
#[utoipa::path(
    post,
    path = "/authentication/password-change",
    request_body = ChangePasswordRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Password changed successfully", body = AuthSuccessResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Current password is incorrect"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn change_password(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<AuthSuccessResponse>> {
    if !state.config.auth.native.enabled {
        return Err(Error::BadRequest {
            message: "Native authentication is disabled".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let user = users
        .get_by_id(current_user.id)
        .await?
        .ok_or(Error::Unauthenticated { message: None })?;

    let is_valid = verify_password(request.current_password.clone(), user.password_hash.clone()).await?;
    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some("Current password is incorrect".to_string()),
        });
    }

    validate_password_length(&request.new_password, &state.config)?;
    let new_password_hash = hash_password(request.new_password.clone(), &state.config).await?;

    users
        .update(
            current_user.id,
            &UserUpdateDBRequest {
                password_hash: Some(new_password_hash),
                ..Default::default()
            },
        )
        .await?;

    Ok(Json(AuthSuccessResponse {
        message: "Password changed successfully".to_string(),
    }))
}
