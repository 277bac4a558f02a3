use super::models::{
    Experiment, ExperimentCreate, ExperimentFilter, ExperimentStats, ExperimentUpdate,
};
use super::services;
use crate::analytics::metrics;
use crate::analytics::models::ExperimentSummary;
use crate::common::errors::AppResult;
use crate::common::state::AppState;
use crate::harvests::models::Harvest;
use crate::harvests::services as harvest_services;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_experiments, create_experiment))
        .routes(routes!(get_experiment_stats))
        .routes(routes!(get_experiment, update_experiment, delete_experiment))
        .routes(routes!(list_experiment_harvests))
        .routes(routes!(get_experiment_summary))
        .with_state(state.clone())
}

#[utoipa::path(
    get,
    path = "/",
    params(ExperimentFilter),
    responses(
        (status = 200, description = "Matching experiments", body = Vec<Experiment>),
        (status = 400, description = "Malformed filter")
    ),
    tag = "experiments",
    summary = "List experiments",
    description = "Filter by status, substrate, name substring and inoculation date range. \
                   Newest inoculation first by default."
)]
pub async fn list_experiments(
    State(state): State<AppState>,
    Query(filter): Query<ExperimentFilter>,
) -> AppResult<Json<Vec<Experiment>>> {
    let experiments = services::list_experiments(&state.db, &filter).await?;
    Ok(Json(experiments.into_iter().map(Experiment::from).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    request_body = ExperimentCreate,
    responses(
        (status = 201, description = "Experiment recorded", body = Experiment),
        (status = 400, description = "Validation failed")
    ),
    tag = "experiments",
    summary = "Record an experiment"
)]
pub async fn create_experiment(
    State(state): State<AppState>,
    Json(input): Json<ExperimentCreate>,
) -> AppResult<(StatusCode, Json<Experiment>)> {
    let created = services::create_experiment(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    get,
    path = "/stats",
    responses(
        (status = 200, description = "Dashboard counters", body = ExperimentStats)
    ),
    tag = "experiments",
    summary = "Aggregate experiment counters"
)]
pub async fn get_experiment_stats(
    State(state): State<AppState>,
) -> AppResult<Json<ExperimentStats>> {
    Ok(Json(services::aggregate_stats(&state.db).await?))
}

#[utoipa::path(
    get,
    path = "/{id}",
    params(("id" = i32, Path, description = "Experiment ID")),
    responses(
        (status = 200, description = "The experiment", body = Experiment),
        (status = 404, description = "Experiment not found")
    ),
    tag = "experiments"
)]
pub async fn get_experiment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Experiment>> {
    Ok(Json(services::get_experiment(&state.db, id).await?.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    params(("id" = i32, Path, description = "Experiment ID")),
    request_body = ExperimentUpdate,
    responses(
        (status = 200, description = "Updated experiment", body = Experiment),
        (status = 400, description = "Validation failed, nothing was changed"),
        (status = 404, description = "Experiment not found")
    ),
    tag = "experiments",
    summary = "Update selected fields",
    description = "Only supplied fields change; the merged record is validated as a whole."
)]
pub async fn update_experiment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(changes): Json<ExperimentUpdate>,
) -> AppResult<Json<Experiment>> {
    let updated = services::update_experiment(&state.db, id, changes).await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    params(("id" = i32, Path, description = "Experiment ID")),
    responses(
        (status = 204, description = "Experiment and its harvests deleted"),
        (status = 404, description = "Experiment not found")
    ),
    tag = "experiments"
)]
pub async fn delete_experiment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    services::delete_experiment(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{id}/harvests",
    params(("id" = i32, Path, description = "Experiment ID")),
    responses(
        (status = 200, description = "Harvests by flush number", body = Vec<Harvest>),
        (status = 404, description = "Experiment not found")
    ),
    tag = "experiments"
)]
pub async fn list_experiment_harvests(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<Harvest>>> {
    let harvests = harvest_services::list_harvests(&state.db, id).await?;
    Ok(Json(harvests.into_iter().map(Harvest::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}/summary",
    params(("id" = i32, Path, description = "Experiment ID")),
    responses(
        (
            status = 200,
            description = "Elapsed days, yield and biological efficiency",
            body = ExperimentSummary
        ),
        (status = 404, description = "Experiment not found")
    ),
    tag = "experiments"
)]
pub async fn get_experiment_summary(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ExperimentSummary>> {
    let experiment = services::get_experiment(&state.db, id).await?;
    let harvests = harvest_services::list_harvests(&state.db, id).await?;
    Ok(Json(metrics::experiment_summary(&experiment, &harvests)?))
}
