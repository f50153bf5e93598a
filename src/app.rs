use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::vitals_page))
        .route("/glicemia", get(handlers::glucose_page).post(handlers::glucose_submit))
        .route("/historico", get(handlers::history_page))
        .route("/manifest.webmanifest", get(handlers::manifest))
        .route("/registro", post(handlers::vitals_submit))
        .route("/glicemia/mais", post(handlers::glucose_more))
        .route("/glicemia/horario", post(handlers::glucose_time))
        .route("/historico/atualizar", post(handlers::history_refresh))
        .route("/tema", post(handlers::theme_toggle))
        .route("/api/registro", get(handlers::get_vitals).post(handlers::post_vitals))
        .route("/api/glicemia", get(handlers::get_glucose).post(handlers::post_glucose))
        .route("/api/glicemia/more", post(handlers::post_glucose_more))
        .route("/api/glicemia/time", post(handlers::post_glucose_time))
        .route("/api/historico", get(handlers::get_history))
        .route("/api/theme", get(handlers::get_theme).post(handlers::post_theme))
        .with_state(state)
}
