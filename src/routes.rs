use crate::common::state::AppState;
use crate::config::Config;
use crate::{analytics, experiments, harvests};
use axum::Router;
use sea_orm::DatabaseConnection;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

pub fn build_router(db: &DatabaseConnection, config: &Config) -> Router {
    #[derive(OpenApi)]
    #[openapi(
        info(
            title = "Myco Logger API",
            description = "Mushroom cultivation experiments, harvests and derived metrics"
        ),
        tags(
            (name = "experiments", description = "Substrate, dates and status of each grow"),
            (name = "harvests", description = "Flushes harvested from an experiment"),
            (name = "analytics", description = "Derived metrics over the recorded experiments")
        )
    )]
    struct ApiDoc;

    let app_state: AppState = AppState::new(db.clone(), config.clone());

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(crate::common::views::router(&app_state)) // Root routes
        .nest("/api/experiments", experiments::views::router(&app_state))
        .nest("/api/harvests", harvests::views::router(&app_state))
        .nest("/api/analytics", analytics::views::router(&app_state))
        .split_for_parts();

    router.merge(Scalar::with_url("/api/docs", api))
}
