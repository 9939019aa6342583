//! Shared helpers for integration-style handler tests.
//!
//! Tests run against a real Postgres database provisioned by `#[sqlx::test]`
//! and drive the full router through `axum_test::TestServer`.

use axum_test::TestServer;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    AppState, build_router,
    api::models::users::{CurrentUser, ResidentResponse, Role},
    auth::{
        password::{Argon2Params, hash_string_with_params},
        session::create_session_token,
    },
    config::Config,
    db::{handlers::users::Users, models::users::UserCreateDBRequest},
};
use crate::db::handlers::repository::Repository;

/// Password shared by all test fixtures.
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Argon2 parameters weak enough to keep test runs fast.
fn test_argon2_params() -> Argon2Params {
    Argon2Params {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

/// Config suitable for tests: fixed secret key, cheap password hashing.
pub fn create_test_config() -> Config {
    let mut config = Config {
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        ..Default::default()
    };
    config.auth.native.password.argon2_memory_kib = 1024;
    config.auth.native.password.argon2_iterations = 1;
    config.auth.native.password.argon2_parallelism = 1;
    config
}

/// Build a `TestServer` around the full application router.
pub fn create_test_app(pool: PgPool) -> TestServer {
    let state = AppState::builder().db(pool).config(create_test_config()).build();
    let router = build_router(state).expect("failed to build router");
    TestServer::new(router).expect("failed to create test server")
}

/// Insert a user with the given role and a unique email.
///
/// The password is always [`TEST_PASSWORD`].
pub async fn create_test_user(pool: &PgPool, role: Role) -> ResidentResponse {
    let mut conn = pool.acquire().await.expect("failed to acquire connection");
    let password_hash = hash_string_with_params(TEST_PASSWORD, Some(test_argon2_params())).expect("failed to hash password");

    let suffix = Uuid::new_v4().simple().to_string();
    let user = Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            name: format!("Test User {}", &suffix[..8]),
            email: format!("testuser_{suffix}@example.com"),
            role,
            phone: None,
            password_hash,
        })
        .await
        .expect("failed to create test user");

    ResidentResponse::from(user)
}

/// Produce a `cookie` header value carrying a valid session token for `user`.
pub fn session_cookie_for(user: &ResidentResponse, config: &Config) -> String {
    let current_user = CurrentUser {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role,
    };
    let token = create_session_token(&current_user, config).expect("failed to create session token");
    format!("{}={}", config.auth.native.session.cookie_name, token)
}
