use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use kiosk_db::{migrations, DbPool};
use serde::Serialize;
use tracing::warn;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub database: HealthCheck,
    pub migrations: HealthCheck,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new().route("/api/health", get(health)).with_state(HealthState { db_pool })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = database_check(&state.db_pool).await;
    let migrations = migration_check(&state.db_pool).await;
    let ready = database.status == "ready" && migrations.status == "ready";

    if !ready {
        warn!(
            event_name = "system.health.degraded",
            database = %database.detail,
            migrations = %migrations.detail,
            "health check degraded"
        );
    }

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "kiosk-server runtime initialized".to_string(),
        },
        database,
        migrations,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn database_check(pool: &DbPool) -> HealthCheck {
    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await {
        Ok(_) => HealthCheck { status: "ready", detail: "database query succeeded".to_string() },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("database query failed: {error}") }
        }
    }
}

async fn migration_check(pool: &DbPool) -> HealthCheck {
    match migrations::status(pool).await {
        Ok((known, applied)) if applied >= known => HealthCheck {
            status: "ready",
            detail: format!("{applied}/{known} migrations applied"),
        },
        Ok((known, applied)) => HealthCheck {
            status: "degraded",
            detail: format!("{applied}/{known} migrations applied; run `kiosk migrate`"),
        },
        Err(error) => HealthCheck {
            status: "degraded",
            detail: format!("migration status unavailable: {error}"),
        },
    }
}
