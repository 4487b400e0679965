use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub id_0: String,
    pub id_1: String,
    pub id_2: String,
    pub continuous_feature: f64,
}

impl PredictRequest {
    pub fn ids(&self) -> [&str; 3] {
        [&self.id_0, &self.id_1, &self.id_2]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub result: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub feature_store_entries: usize,
    pub feature_width: usize,
}
