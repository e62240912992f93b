use std::fmt;
use std::str::FromStr;

use crate::errors::ModelError;

/// Closed set of persisted entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Amenity,
    City,
    Place,
    Review,
    State,
    User,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Amenity,
        EntityKind::City,
        EntityKind::Place,
        EntityKind::Review,
        EntityKind::State,
        EntityKind::User,
    ];

    /// Type name used in `__class__` and storage keys.
    pub fn class_name(self) -> &'static str {
        match self {
            EntityKind::Amenity => "Amenity",
            EntityKind::City => "City",
            EntityKind::Place => "Place",
            EntityKind::Review => "Review",
            EntityKind::State => "State",
            EntityKind::User => "User",
        }
    }

    /// Plural name used in URLs and `/stats`.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Amenity => "amenities",
            EntityKind::City => "cities",
            EntityKind::Place => "places",
            EntityKind::Review => "reviews",
            EntityKind::State => "states",
            EntityKind::User => "users",
        }
    }

    pub fn from_class_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.class_name() == name)
    }

    /// `<Class>.<id>`, the key of a record in the object graph.
    pub fn storage_key(self, id: &str) -> String {
        format!("{}.{}", self.class_name(), id)
    }

    /// Foreign-key attributes and the kind each one must name.
    pub fn parents(self) -> &'static [(&'static str, EntityKind)] {
        match self {
            EntityKind::City => &[("state_id", EntityKind::State)],
            EntityKind::Place => &[("city_id", EntityKind::City), ("user_id", EntityKind::User)],
            EntityKind::Review => &[("place_id", EntityKind::Place), ("user_id", EntityKind::User)],
            EntityKind::Amenity | EntityKind::State | EntityKind::User => &[],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

impl FromStr for EntityKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.class_name() == s || k.collection() == s)
            .ok_or_else(|| ModelError::UnknownClass(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_consistent() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_class_name(kind.class_name()), Some(kind));
            assert_eq!(kind.collection().parse::<EntityKind>().unwrap(), kind);
        }
        assert_eq!(EntityKind::Place.storage_key("p1"), "Place.p1");
        assert!("BaseModel".parse::<EntityKind>().is_err());
    }

    #[test]
    fn parents_follow_the_hierarchy() {
        assert!(EntityKind::State.parents().is_empty());
        assert_eq!(EntityKind::City.parents(), &[("state_id", EntityKind::State)]);
        let review: Vec<_> = EntityKind::Review.parents().iter().map(|(_, k)| *k).collect();
        assert_eq!(review, vec![EntityKind::Place, EntityKind::User]);
    }
}
