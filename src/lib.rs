//! condoctl: an administrative portal for condominium staff.
//!
//! The portal fronts a single Postgres database and exposes a REST API for the
//! day-to-day operation of a condominium: resident enrollment, the physical
//! structure (blocks, units, bookable rooms), a common-area booking workflow,
//! gatehouse logs for visitors and packages, communications and a simple
//! financial ledger.
//!
//! Two staff roles log in: the manager (síndico) sees every section, the
//! doorman (porteiro) only the operational ones. Residents exist in the data
//! model but have no portal login.
//!
//! # Quick Start
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/condoctl \
//! CONDOCTL_SECRET_KEY=change-me \
//! CONDOCTL_ADMIN_PASSWORD=change-me-too \
//! condoctl -f config.yaml
//! ```
//!
//! On startup the server runs pending migrations and makes sure the initial
//! manager account from `admin_email` exists. API docs are served at `/docs`.

use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post, put},
};
use bon::Builder;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument, warn};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod openapi;
pub mod telemetry;
#[cfg(test)]
pub mod test_utils;
pub mod types;

pub use config::Config;

use api::models::users::Role;
use db::{
    handlers::{repository::Repository, users::Users},
    models::users::{UserCreateDBRequest, UserUpdateDBRequest},
};

/// Shared state for all request handlers.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Embedded database migrations, applied on startup.
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Make sure the configured manager account exists.
///
/// Idempotent: if the account already exists its password is reset to the
/// configured one (when set), so a lost manager password can be recovered by
/// restarting with `CONDOCTL_ADMIN_PASSWORD`. Without a configured password an
/// existing account is left untouched and a missing one is not created.
#[instrument(skip_all, fields(email = %config.admin_email))]
pub async fn create_initial_manager_user(config: &Config, db: &PgPool) -> anyhow::Result<()> {
    let params = auth::password::Argon2Params {
        memory_kib: config.auth.native.password.argon2_memory_kib,
        iterations: config.auth.native.password.argon2_iterations,
        parallelism: config.auth.native.password.argon2_parallelism,
    };

    let mut tx = db.begin().await?;

    let existing = Users::new(&mut tx).get_by_email(&config.admin_email).await?;
    if let Some(existing) = existing {
        if let Some(password) = config.admin_password.as_deref() {
            let password_hash = auth::password::hash_string_with_params(password, Some(params))?;
            Users::new(&mut tx)
                .update(
                    existing.id,
                    &UserUpdateDBRequest {
                        password_hash: Some(password_hash),
                        ..Default::default()
                    },
                )
                .await?;
            debug!("Reset password for existing manager account");
        }
        tx.commit().await?;
        return Ok(());
    }

    let Some(password) = config.admin_password.as_deref() else {
        warn!("admin_password is not configured; skipping initial manager creation");
        return Ok(());
    };

    let password_hash = auth::password::hash_string_with_params(password, Some(params))?;
    Users::new(&mut tx)
        .create(&UserCreateDBRequest {
            name: "Síndico".to_string(),
            email: config.admin_email.clone(),
            role: Role::Sindico,
            phone: None,
            password_hash,
        })
        .await?;
    tx.commit().await?;

    info!("Created initial manager account");
    Ok(())
}

/// CORS layer for browser clients.
///
/// Origins come from config as strings and must parse as header values.
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::with_capacity(config.auth.security.cors.allowed_origins.len());
    for origin in &config.auth.security.cors.allowed_origins {
        origins.push(origin.parse::<HeaderValue>()?);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.auth.security.cors.allow_credentials)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    if let Some(max_age) = config.auth.security.cors.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Assemble the full application router.
///
/// Authentication endpoints live at the root; everything else is versioned
/// under `/api/v1` and guarded by the session cookie.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    use api::handlers::{auth as auth_handlers, communications, dashboard, finance, packages, reservations, residents, structure, visitors};

    let auth_routes = Router::new()
        .route("/authentication/login", post(auth_handlers::login))
        .route("/authentication/logout", post(auth_handlers::logout))
        .route("/authentication/session", get(auth_handlers::get_session))
        .route("/authentication/password-change", post(auth_handlers::change_password))
        .with_state(state.clone());

    // /transactions/summary is registered alongside /transactions/{id};
    // the static segment wins during routing.
    let api_routes = Router::new()
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/residents", post(residents::create_resident).get(residents::list_residents))
        .route("/residents/{id}", get(residents::get_resident).put(residents::update_resident))
        .route("/blocks", post(structure::create_block).get(structure::list_blocks))
        .route("/units", post(structure::create_unit).get(structure::list_units))
        .route("/rooms", post(structure::create_room).get(structure::list_rooms))
        .route("/rooms/{id}", put(structure::update_room))
        .route("/reservations", post(reservations::create_reservation).get(reservations::list_reservations))
        .route("/reservations/{id}", get(reservations::get_reservation))
        .route("/reservations/{id}/approve", post(reservations::approve_reservation))
        .route("/reservations/{id}/decline", post(reservations::decline_reservation))
        .route("/reservations/{id}/cancel", post(reservations::cancel_reservation))
        .route("/visitors", post(visitors::create_visitor).get(visitors::list_visitors))
        .route("/visitors/{id}", get(visitors::get_visitor))
        .route("/visitors/{id}/checkout", post(visitors::checkout_visitor))
        .route("/packages", post(packages::create_package).get(packages::list_packages))
        .route("/packages/{id}", get(packages::get_package))
        .route("/packages/{id}/deliver", post(packages::deliver_package))
        .route(
            "/communications",
            post(communications::create_communication).get(communications::list_communications),
        )
        .route("/communications/{id}", get(communications::get_communication))
        .route("/communications/{id}/read", post(communications::mark_communication_read))
        .route("/transactions", post(finance::create_transaction).get(finance::list_transactions))
        .route("/transactions/summary", get(finance::get_summary))
        .route("/transactions/{id}", get(finance::get_transaction))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(auth_routes)
        .nest("/api/v1", api_routes)
        .merge(Scalar::with_url("/docs", openapi::ApiDoc::openapi()));

    let cors_layer = create_cors_layer(&state.config)?;
    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The configured application, ready to serve.
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Connect to the database, run migrations, seed the manager account and
    /// build the router.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let database_url = config
            .database_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("database_url is required; set DATABASE_URL or database_url in the config file"))?;

        let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;

        info!("Running database migrations");
        migrator().run(&pool).await?;

        create_initial_manager_user(&config, &pool).await?;

        let state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Serve until `shutdown` resolves, then drain connections.
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let bind_address = self.config.bind_address();
        let listener = TcpListener::bind(&bind_address).await?;
        info!("Portal listening on http://{bind_address}");

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Closing database connections");
        self.pool.close().await;
        Ok(())
    }
}
