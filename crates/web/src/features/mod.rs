use axum::Router;
use serde::Deserialize;
use storage::Database;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::middleware::auth::ApiKeys;

pub mod rankings;
pub mod reviews;

/// Path segment shared by every judge-scoped category endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct CategoryJudgePath {
    /// Category being judged
    pub category_id: Uuid,
    /// Judge whose scores and rankings are addressed
    pub judge_id: Uuid,
}

pub fn api_routes(api_keys: ApiKeys) -> Router<Database> {
    Router::new()
        .merge(reviews::routes::routes(api_keys.clone()))
        .merge(rankings::routes::routes(api_keys))
}
