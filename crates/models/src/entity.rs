//! Domain entities, independent of the backend that stores them.
//!
//! Each type is declared through [`resource!`], which generates the struct plus its
//! [`Resource`] impl: typed construction from a field mapping, an allow-listed update and the
//! canonical JSON rendering. Nothing here touches storage.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::base::{BaseModel, CLASS_KEY};
use crate::errors::ModelError;
use crate::kind::EntityKind;

/// Behavior shared by every entity type.
pub trait Resource: Clone + Send + Sync + 'static {
    const KIND: EntityKind;
    /// Declared attributes, identity excluded.
    const FIELDS: &'static [&'static str];
    /// Attributes a create request must carry.
    const REQUIRED: &'static [&'static str];
    /// Attributes fixed after creation; updates silently skip them.
    const IMMUTABLE: &'static [&'static str];

    fn base(&self) -> &BaseModel;
    fn base_mut(&mut self) -> &mut BaseModel;

    /// Build from a field mapping. Identity keys are honored when present, unknown keys are kept
    /// as pass-through attributes.
    fn from_attrs(attrs: Map<String, Value>) -> Result<Self, ModelError>;

    /// Apply the mutable subset of `attrs`. All-or-nothing: a badly typed value leaves `self`
    /// untouched.
    fn apply_update(&mut self, attrs: &Map<String, Value>) -> Result<(), ModelError>;

    fn to_json(&self) -> Value;

    fn into_entity(self) -> Entity;
    fn from_entity(entity: Entity) -> Option<Self>;

    fn id(&self) -> &str {
        &self.base().id
    }

    fn touch(&mut self) {
        self.base_mut().touch()
    }
}

fn field_value<T: DeserializeOwned>(field: &str, value: Value) -> Result<T, ModelError> {
    serde_json::from_value(value).map_err(|e| ModelError::invalid_field(field, e))
}

macro_rules! resource {
    (
        $(#[$meta:meta])*
        $name:ident => $variant:ident {
            $( $field:ident : $ty:ty ),+ $(,)?
        }
        required = [$($req:ident),* $(,)?];
        immutable = [$($imm:ident),* $(,)?];
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            pub base: BaseModel,
            $( pub $field: $ty, )+
        }

        impl Resource for $name {
            const KIND: EntityKind = EntityKind::$variant;
            const FIELDS: &'static [&'static str] = &[$(stringify!($field)),+];
            const REQUIRED: &'static [&'static str] = &[$(stringify!($req)),*];
            const IMMUTABLE: &'static [&'static str] = &[$(stringify!($imm)),*];

            fn base(&self) -> &BaseModel {
                &self.base
            }

            fn base_mut(&mut self) -> &mut BaseModel {
                &mut self.base
            }

            fn from_attrs(mut attrs: Map<String, Value>) -> Result<Self, ModelError> {
                let mut base = BaseModel::take_identity(&mut attrs)?;
                $(
                    let $field: $ty = match attrs.remove(stringify!($field)) {
                        Some(value) => field_value(stringify!($field), value)?,
                        None => Default::default(),
                    };
                )+
                base.extra = attrs;
                Ok(Self { base, $($field),+ })
            }

            fn apply_update(&mut self, attrs: &Map<String, Value>) -> Result<(), ModelError> {
                let mut next = self.clone();
                $(
                    if !Self::IMMUTABLE.contains(&stringify!($field)) {
                        if let Some(value) = attrs.get(stringify!($field)) {
                            next.$field = field_value(stringify!($field), value.clone())?;
                        }
                    }
                )+
                *self = next;
                Ok(())
            }

            fn to_json(&self) -> Value {
                let mut map = self.base.extra.clone();
                $(
                    map.insert(
                        stringify!($field).to_string(),
                        serde_json::to_value(&self.$field).unwrap_or(Value::Null),
                    );
                )+
                self.base.write_identity(&mut map, Self::KIND);
                Value::Object(map)
            }

            fn into_entity(self) -> Entity {
                Entity::$variant(self)
            }

            fn from_entity(entity: Entity) -> Option<Self> {
                match entity {
                    Entity::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }

        impl From<$name> for Entity {
            fn from(value: $name) -> Self {
                Entity::$variant(value)
            }
        }
    };
}

resource! {
    State => State {
        name: String,
    }
    required = [name];
    immutable = [];
}

resource! {
    City => City {
        name: String,
        state_id: String,
    }
    required = [name, state_id];
    immutable = [state_id];
}

resource! {
    User => User {
        email: String,
        password: String,
        first_name: Option<String>,
        last_name: Option<String>,
    }
    required = [email, password];
    immutable = [email];
}

resource! {
    Place => Place {
        city_id: String,
        user_id: String,
        name: String,
        description: Option<String>,
        number_rooms: i32,
        number_bathrooms: i32,
        max_guest: i32,
        price_by_night: i32,
        latitude: Option<f64>,
        longitude: Option<f64>,
        amenity_ids: AmenityIds,
    }
    required = [city_id, user_id, name];
    immutable = [city_id, user_id, amenity_ids];
}

resource! {
    Review => Review {
        place_id: String,
        user_id: String,
        text: String,
    }
    required = [place_id, user_id, text];
    immutable = [place_id, user_id];
}

resource! {
    Amenity => Amenity {
        name: String,
    }
    required = [name];
    immutable = [];
}

/// Amenities linked to a place. A set, so an id can never appear twice; rendered as a sorted
/// JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AmenityIds(BTreeSet<String>);

impl AmenityIds {
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    /// Returns `false` when the id was already linked.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.0.insert(id.into())
    }

    /// Returns `false` when the id was not linked.
    pub fn remove(&mut self, id: &str) -> bool {
        self.0.remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for AmenityIds {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Any persisted entity; the unit the storage engine moves around.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Amenity(Amenity),
    City(City),
    Place(Place),
    Review(Review),
    State(State),
    User(User),
}

macro_rules! dispatch {
    ($entity:expr, $v:ident => $body:expr) => {
        match $entity {
            Entity::Amenity($v) => $body,
            Entity::City($v) => $body,
            Entity::Place($v) => $body,
            Entity::Review($v) => $body,
            Entity::State($v) => $body,
            Entity::User($v) => $body,
        }
    };
}

impl Entity {
    /// Construct an entity of `kind` from a field mapping.
    pub fn build(kind: EntityKind, attrs: Map<String, Value>) -> Result<Self, ModelError> {
        Ok(match kind {
            EntityKind::Amenity => Amenity::from_attrs(attrs)?.into(),
            EntityKind::City => City::from_attrs(attrs)?.into(),
            EntityKind::Place => Place::from_attrs(attrs)?.into(),
            EntityKind::Review => Review::from_attrs(attrs)?.into(),
            EntityKind::State => State::from_attrs(attrs)?.into(),
            EntityKind::User => User::from_attrs(attrs)?.into(),
        })
    }

    /// Rehydrate a serialized record, dispatching on its `__class__`.
    pub fn from_record(record: Map<String, Value>) -> Result<Self, ModelError> {
        let class = record
            .get(CLASS_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| ModelError::Corrupt(format!("record without {CLASS_KEY}")))?;
        let kind = EntityKind::from_class_name(class).ok_or_else(|| ModelError::UnknownClass(class.to_string()))?;
        Self::build(kind, record)
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Amenity(_) => EntityKind::Amenity,
            Entity::City(_) => EntityKind::City,
            Entity::Place(_) => EntityKind::Place,
            Entity::Review(_) => EntityKind::Review,
            Entity::State(_) => EntityKind::State,
            Entity::User(_) => EntityKind::User,
        }
    }

    pub fn base(&self) -> &BaseModel {
        dispatch!(self, v => v.base())
    }

    pub fn base_mut(&mut self) -> &mut BaseModel {
        dispatch!(self, v => v.base_mut())
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn storage_key(&self) -> String {
        self.kind().storage_key(self.id())
    }

    pub fn touch(&mut self) {
        self.base_mut().touch()
    }

    pub fn to_json(&self) -> Value {
        dispatch!(self, v => v.to_json())
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Entity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = Map::<String, Value>::deserialize(deserializer)?;
        Entity::from_record(record).map_err(serde::de::Error::custom)
    }
}
