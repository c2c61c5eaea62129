use axum::{
  routing::{delete, get, post, put},
  Router,
};
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::handlers;
use crate::state::AppState;

/// The full HTTP API, mounted under `/api`
pub fn app(state: AppState) -> Router {
  let auth_routes = Router::new()
    .route("/register", post(auth::register))
    .route("/login", post(auth::login))
    .route("/logout", post(auth::logout))
    .route("/me", get(auth::me));

  let flashcard_routes = Router::new()
    .route("/folders", get(handlers::list_folders).post(handlers::create_folder))
    .route("/folders/{folder_id}", delete(handlers::delete_folder))
    .route("/sets", get(handlers::list_sets).post(handlers::create_set))
    .route(
      "/sets/{set_id}",
      get(handlers::get_set)
        .put(handlers::update_set)
        .delete(handlers::delete_set),
    )
    .route("/sets/{set_id}/cards", get(handlers::list_cards).post(handlers::create_card))
    .route(
      "/sets/{set_id}/cards/{card_id}",
      put(handlers::update_card).delete(handlers::delete_card),
    )
    .route("/sets/{set_id}/study", get(handlers::start_study))
    .route("/sets/{set_id}/study/cards/{card_id}/answer", get(handlers::card_answer))
    .route("/sets/{set_id}/study/answer", post(handlers::submit_answer))
    .route("/sets/{set_id}/stats", get(handlers::set_stats))
    .route("/sets/{set_id}/round/complete", post(handlers::complete_round))
    .route("/sets/{set_id}/round/last", get(handlers::last_round))
    .route("/sets/{set_id}/round/reset", post(handlers::reset_round));

  let api = Router::new()
    .nest("/auth", auth_routes)
    .nest("/flashcards", flashcard_routes)
    .route("/study-sessions/weekly", get(handlers::weekly_study));

  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
