use axum::{middleware::from_fn_with_state, routing::post, Router};
use crate::{AppState, controllers::slack_controller, middleware::slack_signature};

pub fn add_routes(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    let slash_commands = Router::new()
        .route("/quote-alert", post(slack_controller::post_quote_alert))
        .route("/quote", post(slack_controller::post_quote))
        .route_layer(from_fn_with_state(state.clone(), slack_signature::require_slack_signature));

    router.merge(slash_commands)
}
