use axum::{
    Router, middleware,
    routing::{get, put},
};
use storage::Database;

use super::handlers::{get_review, get_submission, list_submissions, upsert_review};
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let upsert = put(upsert_review).route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route(
            "/categories/:category_id/judges/:judge_id/submissions",
            get(list_submissions),
        )
        .route("/submissions/:submission_id", get(get_submission))
        .route(
            "/submissions/:submission_id/reviews/:judge_id",
            get(get_review).merge(upsert),
        )
}
