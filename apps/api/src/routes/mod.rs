pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::cards::handlers as card_handlers;
use crate::chat::handlers as chat_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/chat", post(chat_handlers::handle_chat))
        .route("/api/cards/:category", get(card_handlers::handle_get_card))
        .route("/api/personal", get(card_handlers::handle_get_personal))
        .with_state(state)
}
