use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Build the full HTTP router.
pub fn app(state: AppState) -> Router {
    let security = &state.config.security;
    let cors = security.enable_cors.then(|| cors_layer(&security.cors_origins));
    let body_limit = state.config.api.max_request_size_bytes;

    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(auth_public_routes())
        // Protected
        .merge(note_routes(state.clone()))
        .layer(RequestBodyLimitLayer::new(body_limit));

    if let Some(cors) = cors {
        router = router.layer(cors);
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
}

fn note_routes(state: AppState) -> Router<AppState> {
    use protected::notes;

    Router::new()
        .route("/notes", get(notes::list_notes))
        .route("/addNote", post(notes::add_note))
        .route("/getNote", get(notes::get_note))
        .route("/deleteNote", delete(notes::delete_note))
        .route("/updateNote", put(notes::update_note))
        .route("/freeze", put(notes::freeze_note))
        .route("/insertSampleNotes", post(notes::insert_sample_notes))
        // route_layer so unknown paths stay 404 instead of 401
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
