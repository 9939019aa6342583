//! Dashboard overview endpoint.

use crate::{
    AppState,
    api::models::{dashboard::DashboardCounts, users::CurrentUser},
    auth::permissions::{Section, require_section},
    db::handlers::{packages::Packages, reservations::Reservations, users::Users, visitors::Visitors},
    errors::{Error, Result},
};
use axum::{Json, extract::State};

/// Entity counts for the portal landing page
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    responses(
        (status = 200, description = "Dashboard counts", body = DashboardCounts),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_dashboard(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<DashboardCounts>> {
    require_section(&current_user, Section::Dashboard)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let active_residents = Users::new(&mut conn).count_active().await?;
    let pending_reservations = Reservations::new(&mut conn).count_pending().await?;
    let awaiting_packages = Packages::new(&mut conn).count_awaiting().await?;
    let visitors_on_site = Visitors::new(&mut conn).count_on_site().await?;

    Ok(Json(DashboardCounts {
        active_residents,
        pending_reservations,
        awaiting_packages,
        visitors_on_site,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::db::handlers::repository::Repository;
    use crate::db::handlers::structure::{Blocks, Rooms, Units};
    use crate::db::models::structure::{BlockCreateDBRequest, RoomCreateDBRequest, UnitCreateDBRequest};
    use crate::test_utils::{create_test_app, create_test_config, create_test_user, session_cookie_for};
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_dashboard_counts(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let config = create_test_config();
        let manager = create_test_user(&pool, Role::Sindico).await;
        let doorman = create_test_user(&pool, Role::Porteiro).await;
        let resident = create_test_user(&pool, Role::Morador).await;
        let manager_cookie = session_cookie_for(&manager, &config);
        let doorman_cookie = session_cookie_for(&doorman, &config);

        // Seed one pending reservation, one awaiting package and one visitor
        let (unit_id, room_id) = {
            let mut conn = pool.acquire().await.unwrap();
            let block = Blocks::new(&mut conn)
                .create(&BlockCreateDBRequest {
                    name: "Bloco A".to_string(),
                    description: None,
                })
                .await
                .unwrap();
            let unit = Units::new(&mut conn)
                .create(&UnitCreateDBRequest {
                    number: "101".to_string(),
                    block_id: block.id,
                })
                .await
                .unwrap();
            let room = Rooms::new(&mut conn)
                .create(&RoomCreateDBRequest {
                    name: "Academia".to_string(),
                    description: None,
                    capacity: None,
                })
                .await
                .unwrap();
            (unit.id, room.id)
        };

        server
            .post("/api/v1/reservations")
            .add_header("cookie", doorman_cookie.clone())
            .json(&json!({
                "room_id": room_id,
                "starts_at": "2026-09-10T10:00:00Z",
                "ends_at": "2026-09-10T12:00:00Z",
                "notes": null,
                "user_id": resident.id
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        server
            .post("/api/v1/packages")
            .add_header("cookie", doorman_cookie.clone())
            .json(&json!({
                "recipient_id": resident.id,
                "unit_id": unit_id,
                "store": "Loja",
                "tracking_code": null,
                "notes": null
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        server
            .post("/api/v1/visitors")
            .add_header("cookie", doorman_cookie)
            .json(&json!({ "name": "Visita", "document": "doc", "unit_id": unit_id, "notes": null }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server.get("/api/v1/dashboard").add_header("cookie", manager_cookie).await;
        response.assert_status(axum::http::StatusCode::OK);

        let counts: DashboardCounts = response.json();
        // manager + doorman + resident fixtures are all active
        assert_eq!(counts.active_residents, 3);
        assert_eq!(counts.pending_reservations, 1);
        assert_eq!(counts.awaiting_packages, 1);
        assert_eq!(counts.visitors_on_site, 1);
    }
}
