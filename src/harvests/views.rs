use super::models::{Harvest, HarvestCreate, HarvestUpdate};
use super::services;
use crate::common::errors::AppResult;
use crate::common::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_harvest))
        .routes(routes!(get_harvest, update_harvest, delete_harvest))
        .with_state(state.clone())
}

#[utoipa::path(
    post,
    path = "/",
    request_body = HarvestCreate,
    responses(
        (status = 201, description = "Harvest recorded", body = Harvest),
        (status = 400, description = "Invalid harvest or experiment closed to harvests"),
        (status = 404, description = "Experiment not found")
    ),
    tag = "harvests",
    summary = "Record a flush"
)]
pub async fn create_harvest(
    State(state): State<AppState>,
    Json(input): Json<HarvestCreate>,
) -> AppResult<(StatusCode, Json<Harvest>)> {
    let created = services::create_harvest(&state.db, input, state.config.harvest_policy).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    get,
    path = "/{id}",
    params(("id" = i32, Path, description = "Harvest ID")),
    responses(
        (status = 200, description = "The harvest", body = Harvest),
        (status = 404, description = "Harvest not found")
    ),
    tag = "harvests"
)]
pub async fn get_harvest(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Harvest>> {
    Ok(Json(services::get_harvest(&state.db, id).await?.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    params(("id" = i32, Path, description = "Harvest ID")),
    request_body = HarvestUpdate,
    responses(
        (status = 200, description = "Updated harvest", body = Harvest),
        (status = 404, description = "Harvest not found")
    ),
    tag = "harvests",
    summary = "Replace quality notes"
)]
pub async fn update_harvest(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(changes): Json<HarvestUpdate>,
) -> AppResult<Json<Harvest>> {
    let updated = services::update_harvest_notes(&state.db, id, changes).await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    params(("id" = i32, Path, description = "Harvest ID")),
    responses(
        (status = 204, description = "Harvest deleted"),
        (status = 404, description = "Harvest not found")
    ),
    tag = "harvests"
)]
pub async fn delete_harvest(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    services::delete_harvest(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
