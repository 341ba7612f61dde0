pub mod auth_gate;
pub mod database;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod store;

pub use auth_gate::{AuthDenied, AuthGate, Identity, JwtAuthGate, OpenAuthGate};
pub use database::{MongoDb, MongoItemStore};
pub use error::StoreError;
pub use memory::MemoryItemStore;
pub use self::metrics::{get_metrics, init_metrics};
pub use store::ItemStore;
