// API module - HTTP surface over the classifier

pub mod rest;

use serde::{Deserialize, Serialize};

use crate::classifier::Classification;

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassifyRequest {
    /// Management address of the device the dump came from
    #[serde(alias = "sourceIp")]
    pub source_ip: String,
    /// Concatenated terse output as captured
    pub raw: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyResponse {
    /// Stamped by the HTTP layer, never by the classifier
    pub classified_at: String,
    #[serde(flatten)]
    pub classification: Classification,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
