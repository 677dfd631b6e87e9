// app.rs - Router assembly: public routes, protected routes, global layers

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

pub const PANIC_MESSAGE: &str = "Oops! Something apparently broke...";

pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    let mut app = Router::new()
        .merge(public_routes())
        .merge(movie_routes(state.clone()))
        .merge(user_routes(state.clone()))
        .with_state(state);

    if let Some(dir) = &config.server.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(TimeoutLayer::new(Duration::from_secs(
        config.server.request_timeout_secs,
    )))
    .layer(CatchPanicLayer::custom(handle_panic))
    .layer(cors_layer(&config.security))
    .layer(TraceLayer::new_for_http())
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/login", post(public::login))
        .route("/users", post(public::register))
}

fn movie_routes(state: AppState) -> Router<AppState> {
    use protected::movies;

    Router::new()
        .route("/movies", get(movies::list_movies))
        .route("/movies/:title", get(movies::movie_by_title))
        .route("/genre/:name", get(movies::genre_by_name))
        .route("/director/:name", get(movies::director_by_name))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn user_routes(state: AppState) -> Router<AppState> {
    use protected::{favorites, users};

    Router::new()
        .route("/users", get(users::list_users))
        .route(
            "/users/:username",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/users/:username/movies/:movie_id",
            post(favorites::add_favorite).delete(favorites::remove_favorite),
        )
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.allows_any_origin() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring unparseable CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!("Handler panicked: {}", detail);

    (StatusCode::INTERNAL_SERVER_ERROR, PANIC_MESSAGE).into_response()
}
