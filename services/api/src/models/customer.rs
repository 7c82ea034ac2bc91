//! Customer model and related payloads

use serde::{Deserialize, Serialize};

/// Customer entity as stored
#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub address: String,
}

/// Request for creating or replacing a customer
#[derive(Debug, Deserialize)]
pub struct CustomerRequest {
    pub name: String,
    pub address: String,
}
