//! Account endpoints. Acknowledge only; sessions belong to the identity
//! provider that issues the bearer tokens.

use crate::dtos::MessageResponse;
use axum::Json;

pub async fn signup() -> Json<MessageResponse> {
    Json(MessageResponse::new("User signed up successfully"))
}

pub async fn login() -> Json<MessageResponse> {
    Json(MessageResponse::new("User logged in successfully"))
}

pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse::new("User logged out successfully"))
}
