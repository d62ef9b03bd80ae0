use axum::{Json, Router, response::IntoResponse, routing::get};
use crates::domain::value_objects::plans::{PLAN_CATALOG, PlanDto};
use tracing::info;

/// Plan catalog routes. Public: pricing is shown before sign-in.
pub fn routes() -> Router {
    Router::new().route("/", get(list_plans))
}

pub async fn list_plans() -> impl IntoResponse {
    info!("plans: catalog request received");
    let plans: Vec<PlanDto> = PLAN_CATALOG.iter().map(PlanDto::from).collect();
    Json(plans)
}
