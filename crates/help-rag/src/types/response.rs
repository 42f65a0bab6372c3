//! Response bodies returned by the gateway

use serde::{Deserialize, Serialize};

/// Acknowledgement for a successful ingestion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddResponse {
    pub message: String,
}

impl AddResponse {
    pub fn added() -> Self {
        Self {
            message: "Data added successfully".to_string(),
        }
    }
}

/// Textual answer from a query or chat call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerResponse {
    pub response: String,
}

impl AnswerResponse {
    pub fn new(response: String) -> Self {
        Self { response }
    }
}
