pub mod auth;
pub mod items;

pub use auth::MessageResponse;
pub use items::{SearchParams, StatusResponse};
