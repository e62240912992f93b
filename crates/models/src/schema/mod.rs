//! Relational mapping of the entities (sea-orm), one module per table.
//!
//! Pass-through attributes live in a nullable `extra` text column holding a JSON object so both
//! backends round-trip the same fields.

pub mod amenity;
pub mod city;
pub mod place;
pub mod place_amenity;
pub mod review;
pub mod state;
pub mod user;

use serde_json::{Map, Value};

use crate::errors::ModelError;

pub(crate) fn encode_extra(extra: &Map<String, Value>) -> Option<String> {
    if extra.is_empty() {
        None
    } else {
        Some(Value::Object(extra.clone()).to_string())
    }
}

pub(crate) fn decode_extra(raw: Option<String>) -> Result<Map<String, Value>, ModelError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(Map::new()),
        Some(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(ModelError::Corrupt(format!("extra column is not an object: {other}"))),
            Err(e) => Err(ModelError::Corrupt(format!("extra column: {e}"))),
        },
    }
}
