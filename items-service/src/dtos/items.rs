use crate::models::NearQuery;
use serde::{Deserialize, Serialize};

/// Query string of `GET /items/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters; defaults to 1000.
    pub radius: Option<f64>,
}

impl From<SearchParams> for NearQuery {
    fn from(params: SearchParams) -> Self {
        NearQuery::new(params.longitude, params.latitude, params.radius)
    }
}

/// Acknowledgement for update and delete.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub id: String,
    pub status: String,
}

impl StatusResponse {
    pub fn updated(id: String) -> Self {
        Self {
            id,
            status: "updated".to_string(),
        }
    }

    pub fn deleted(id: String) -> Self {
        Self {
            id,
            status: "deleted".to_string(),
        }
    }
}
