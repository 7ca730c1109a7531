//! Wire types of the document database REST API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One document in a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireDocument {
    pub id: String,
    #[serde(default)]
    pub data: Value,
}

/// Response of a collection listing or query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentList {
    #[serde(default)]
    pub documents: Vec<WireDocument>,
}

/// Response of a document creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Created {
    pub id: String,
}
