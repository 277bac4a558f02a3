use super::models::{AppInfo, HealthCheck};
use crate::common::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(healthz))
        .routes(routes!(get_app_info))
        .with_state(state.clone())
}

#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = OK, description = "Database reachable", body = HealthCheck),
        (status = INTERNAL_SERVER_ERROR, description = "Database unreachable", body = HealthCheck)
    )
)]
pub async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<HealthCheck>) {
    if let Err(err) = state.db.ping().await {
        tracing::warn!(error = %err, "health check failed");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HealthCheck {
                status: "error".to_string(),
            }),
        );
    }

    (
        StatusCode::OK,
        Json(HealthCheck {
            status: "ok".to_string(),
        }),
    )
}

#[utoipa::path(
    get,
    path = "/api/config",
    responses(
        (status = OK, description = "Application settings relevant to clients", body = AppInfo)
    )
)]
pub async fn get_app_info(State(state): State<AppState>) -> Json<AppInfo> {
    Json(AppInfo {
        app_name: state.config.app_name.clone(),
        deployment: state.config.deployment.clone(),
        harvest_policy: state.config.harvest_policy,
    })
}
