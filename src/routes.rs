use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware::{from_fn_with_state, map_response},
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::auth::Role;
use crate::config::{AppConfig, SecurityConfig};
use crate::handlers::{public, resources};
use crate::middleware::{require_role, RoleGate, ADMIN_ONLY, STAFF};
use crate::state::AppState;

/// Builds the full application router.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        .route("/", get(public::root))
        .route("/api/health", get(public::health))
        .route("/api/login", post(public::login))
        .route("/api/logout", post(public::logout))
        .route("/api/programs", get(resources::programs::list))
        .route("/api/dashboard/stats", get(resources::dashboard::stats))
        .merge(student_routes(&state))
        .merge(department_routes(&state))
        .merge(faculty_routes(&state))
        .merge(course_routes(&state))
        .merge(score_routes(&state))
        .fallback(public::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(public::panic_response))
                .layer(cors_layer(&config.security))
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
                .layer(map_response(public::method_not_allowed)),
        );

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

/// Routes behind a role check. Requests that fail it never reach a handler.
fn gated(state: &AppState, roles: &'static [Role], routes: Router<AppState>) -> Router<AppState> {
    let gate = RoleGate::new(state.sessions.clone(), roles);
    routes.route_layer(from_fn_with_state(gate, require_role))
}

fn student_routes(state: &AppState) -> Router<AppState> {
    use resources::students;

    Router::new()
        .route("/api/students", get(students::list))
        .merge(gated(
            state,
            ADMIN_ONLY,
            Router::new()
                .route("/api/students", post(students::create))
                .route("/api/students/:student_id", delete(students::delete)),
        ))
}

fn department_routes(state: &AppState) -> Router<AppState> {
    use resources::departments;

    Router::new()
        .route("/api/departments", get(departments::list))
        .merge(gated(
            state,
            ADMIN_ONLY,
            Router::new()
                .route("/api/departments", post(departments::create))
                .route(
                    "/api/departments/:dept_id",
                    put(departments::update).delete(departments::delete),
                ),
        ))
}

fn faculty_routes(state: &AppState) -> Router<AppState> {
    use resources::faculty;

    Router::new()
        .route("/api/faculty", get(faculty::list))
        .merge(gated(
            state,
            ADMIN_ONLY,
            Router::new()
                .route("/api/faculty", post(faculty::create))
                .route("/api/faculty/:faculty_id", put(faculty::update).delete(faculty::delete)),
        ))
}

fn course_routes(state: &AppState) -> Router<AppState> {
    use resources::courses;

    Router::new()
        .route("/api/courses", get(courses::list))
        .merge(gated(
            state,
            ADMIN_ONLY,
            Router::new()
                .route("/api/courses", post(courses::create))
                .route("/api/courses/:course_id", delete(courses::delete)),
        ))
}

fn score_routes(state: &AppState) -> Router<AppState> {
    use resources::scores;

    Router::new()
        .route("/api/scores", get(scores::list))
        .merge(gated(
            state,
            STAFF,
            Router::new()
                .route("/api/scores", post(scores::create))
                .route("/api/scores/:score_id", put(scores::update)),
        ))
        .merge(gated(
            state,
            ADMIN_ONLY,
            Router::new().route("/api/scores/:score_id", delete(scores::delete)),
        ))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}
