//! Identity contract shared by every entity: id, timestamps and pass-through attributes.

use chrono::{NaiveDateTime, SubsecRound, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::kind::EntityKind;

/// Rendering of `created_at` / `updated_at` in JSON.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
const TIME_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Key naming the entity type inside a serialized record.
pub const CLASS_KEY: &str = "__class__";

pub const IDENTITY_FIELDS: [&str; 3] = ["id", "created_at", "updated_at"];

/// Current UTC time truncated to microseconds, the precision every backend can store.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}

pub fn format_time(t: &NaiveDateTime) -> String {
    t.format(TIME_FORMAT).to_string()
}

pub fn parse_time(s: &str) -> Result<NaiveDateTime, ModelError> {
    NaiveDateTime::parse_from_str(s, TIME_PARSE_FORMAT)
        .map(|t| t.trunc_subsecs(6))
        .map_err(|e| ModelError::Validation(format!("invalid timestamp `{s}`: {e}")))
}

fn time_value(field: &str, value: Value) -> Result<Option<NaiveDateTime>, ModelError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => parse_time(&s).map(Some),
        other => Err(ModelError::invalid_field(field, format!("expected timestamp string, got {other}"))),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BaseModel {
    pub id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    /// Attributes the entity type does not declare; stored and rendered as-is.
    pub extra: Map<String, Value>,
}

impl Default for BaseModel {
    fn default() -> Self {
        Self::generate()
    }
}

impl BaseModel {
    /// Fresh identity: random UUID v4, both timestamps set to now.
    pub fn generate() -> Self {
        let ts = now();
        Self { id: Uuid::new_v4().to_string(), created_at: ts, updated_at: ts, extra: Map::new() }
    }

    /// Remove identity keys (and `__class__`) from `attrs`.
    ///
    /// Provided values are honored so stored records rehydrate unchanged; anything missing is
    /// generated. `updated_at` is clamped so it never precedes `created_at`.
    pub fn take_identity(attrs: &mut Map<String, Value>) -> Result<Self, ModelError> {
        attrs.remove(CLASS_KEY);
        let mut base = Self::generate();

        match attrs.remove("id") {
            None | Some(Value::Null) => {}
            Some(Value::String(id)) if !id.trim().is_empty() => base.id = id,
            Some(other) => return Err(ModelError::invalid_field("id", format!("expected non-empty string, got {other}"))),
        }
        if let Some(created) = attrs.remove("created_at") {
            if let Some(t) = time_value("created_at", created)? {
                base.created_at = t;
            }
        }
        if let Some(updated) = attrs.remove("updated_at") {
            if let Some(t) = time_value("updated_at", updated)? {
                base.updated_at = t;
            }
        }
        if base.updated_at < base.created_at {
            base.updated_at = base.created_at;
        }
        Ok(base)
    }

    /// Refresh `updated_at` ahead of a mutating save.
    pub fn touch(&mut self) {
        self.updated_at = now().max(self.created_at);
    }

    pub(crate) fn write_identity(&self, map: &mut Map<String, Value>, kind: EntityKind) {
        map.insert("id".into(), Value::String(self.id.clone()));
        map.insert("created_at".into(), Value::String(format_time(&self.created_at)));
        map.insert("updated_at".into(), Value::String(format_time(&self.updated_at)));
        map.insert(CLASS_KEY.into(), Value::String(kind.class_name().to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn time_format_round_trips() {
        let t = now();
        assert_eq!(parse_time(&format_time(&t)).unwrap(), t);
        assert!(parse_time("2017-09-28T21:05:54.119427").is_ok());
        assert!(parse_time("yesterday").is_err());
    }

    #[test]
    fn honors_provided_identity() {
        let mut attrs = object(json!({
            "id": "abc",
            "created_at": "2017-09-28T21:05:54.119427",
            "updated_at": "2017-09-28T21:05:54.119572",
            "__class__": "State",
            "name": "Texas"
        }));
        let base = BaseModel::take_identity(&mut attrs).unwrap();
        assert_eq!(base.id, "abc");
        assert_eq!(format_time(&base.created_at), "2017-09-28T21:05:54.119427");
        assert_eq!(format_time(&base.updated_at), "2017-09-28T21:05:54.119572");
        assert_eq!(attrs.len(), 1);
        assert!(attrs.contains_key("name"));
    }

    #[test]
    fn clamps_updated_before_created() {
        let mut attrs = object(json!({
            "created_at": "2020-01-02T00:00:00.000000",
            "updated_at": "2020-01-01T00:00:00.000000"
        }));
        let base = BaseModel::take_identity(&mut attrs).unwrap();
        assert_eq!(base.updated_at, base.created_at);
    }

    #[test]
    fn rejects_non_string_id() {
        let mut attrs = object(json!({"id": 12}));
        assert!(matches!(BaseModel::take_identity(&mut attrs), Err(ModelError::Validation(_))));
    }

    #[test]
    fn touch_never_goes_backwards() {
        let mut base = BaseModel::generate();
        base.created_at = base.created_at + chrono::Duration::days(1);
        base.touch();
        assert!(base.updated_at >= base.created_at);
    }
}
