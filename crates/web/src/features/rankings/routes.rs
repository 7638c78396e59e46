use axum::{
    Router, middleware,
    routing::{get, put},
};
use storage::Database;

use super::handlers::{get_rankings, save_rankings};
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    // Reads and writes share one path, so only the PUT method carries the auth layer.
    let save = put(save_rankings).route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new().route(
        "/categories/:category_id/judges/:judge_id/rankings",
        get(get_rankings).merge(save),
    )
}
