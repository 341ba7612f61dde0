use crate::models::MalformedDocument;
use mongodb::error::ErrorKind;
use service_core::error::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid item id: {0}")]
    InvalidId(String),

    #[error("item not found")]
    NotFound,

    #[error("invalid item: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("malformed stored document: {0}")]
    MalformedDocument(#[from] MalformedDocument),

    #[error("item store unavailable: {0}")]
    Unavailable(anyhow::Error),
}

impl StoreError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::InvalidId(_) => "invalid_id",
            StoreError::NotFound => "not_found",
            StoreError::Validation(_) => "validation",
            StoreError::MalformedDocument(_) => "malformed",
            StoreError::Unavailable(_) => "unavailable",
        }
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::BsonDeserialization(e) => {
                StoreError::MalformedDocument(MalformedDocument::Undecodable(e.to_string()))
            }
            _ => StoreError::Unavailable(anyhow::Error::new(err)),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidId(id) => {
                AppError::BadRequest(anyhow::anyhow!("Invalid item id: {}", id))
            }
            StoreError::NotFound => AppError::NotFound(anyhow::anyhow!("Item not found")),
            StoreError::Validation(errors) => AppError::ValidationError(errors),
            StoreError::MalformedDocument(e) => {
                AppError::InternalError(anyhow::anyhow!("Malformed stored document: {}", e))
            }
            StoreError::Unavailable(e) => AppError::DatabaseError(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoDocument;
    use mongodb::bson::{doc, from_document};

    #[test]
    fn decode_failure_is_malformed_not_unavailable() {
        let decode_err = from_document::<GeoDocument>(doc! { "name": 7 }).unwrap_err();
        let err = StoreError::from(mongodb::error::Error::from(decode_err));

        assert_eq!(err.kind(), "malformed");
        assert!(matches!(
            AppError::from(err),
            AppError::InternalError(_)
        ));
    }

    #[test]
    fn driver_failure_is_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = StoreError::from(mongodb::error::Error::from(io));

        assert_eq!(err.kind(), "unavailable");
        assert!(matches!(AppError::from(err), AppError::DatabaseError(_)));
    }
}
