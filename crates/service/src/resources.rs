//! CRUD over any entity type, written once against the session contract.

use std::collections::BTreeMap;

use models::base::{CLASS_KEY, IDENTITY_FIELDS};
use models::{EntityKind, Resource};
use serde_json::{Map, Value};
use tracing::info;

use crate::errors::ServiceError;
use crate::storage::Session;

/// Order derived lists by age, ties broken by id.
pub(crate) fn sort_by_age<T: Resource>(items: &mut [T]) {
    items.sort_by(|a, b| {
        (a.base().created_at, a.id()).cmp(&(b.base().created_at, b.id()))
    });
}

/// Typed lookup; `None` when absent.
pub async fn fetch<T: Resource>(s: &mut dyn Session, id: &str) -> Result<Option<T>, ServiceError> {
    Ok(s.get(T::KIND, id).await?.and_then(T::from_entity))
}

pub async fn get<T: Resource>(s: &mut dyn Session, id: &str) -> Result<T, ServiceError> {
    fetch::<T>(s, id).await?.ok_or_else(|| ServiceError::not_found(T::KIND.class_name()))
}

pub async fn list<T: Resource>(s: &mut dyn Session) -> Result<Vec<T>, ServiceError> {
    let mut items: Vec<T> = s.all(Some(T::KIND)).await?.into_values().filter_map(T::from_entity).collect();
    sort_by_age(&mut items);
    Ok(items)
}

/// Every entity of `T` whose attribute matches, oldest first.
pub(crate) async fn list_where<T, F>(s: &mut dyn Session, pred: F) -> Result<Vec<T>, ServiceError>
where
    T: Resource,
    F: Fn(&T) -> bool + Send,
{
    let mut items = list::<T>(s).await?;
    items.retain(|item| pred(item));
    Ok(items)
}

async fn ensure_exists(s: &mut dyn Session, kind: EntityKind, id: &str) -> Result<(), ServiceError> {
    match s.get(kind, id).await? {
        Some(_) => Ok(()),
        None => Err(ServiceError::not_found(kind.class_name())),
    }
}

/// Create a `T` from a request body.
///
/// Identity fields are stripped so ids are always generated here. Required attributes are checked
/// in declaration order, and a reference to a parent must resolve before the next attribute is
/// looked at.
pub async fn create<T: Resource>(s: &mut dyn Session, mut attrs: Map<String, Value>) -> Result<T, ServiceError> {
    for key in IDENTITY_FIELDS.into_iter().chain([CLASS_KEY]) {
        attrs.remove(key);
    }
    if T::KIND == EntityKind::Place {
        attrs.remove("amenity_ids");
    }
    let parents = T::KIND.parents();
    for field in T::REQUIRED {
        let Some(value) = attrs.get(*field) else {
            return Err(ServiceError::Validation(format!("Missing {field}")));
        };
        let parent = parents.iter().find(|(name, _)| name == field).map(|(_, kind)| *kind);
        if let (Some(kind), Value::String(id)) = (parent, value) {
            ensure_exists(s, kind, id).await?;
        }
    }

    let item = T::from_attrs(attrs)?;
    s.new(item.clone().into_entity()).await?;
    s.save().await?;
    info!(event = "created", class = %T::KIND, id = %item.id());
    Ok(item)
}

/// Create a `T` under the parent named in the path; the path wins over the body.
pub async fn create_under<T: Resource>(
    s: &mut dyn Session,
    parent_field: &str,
    parent_id: &str,
    mut attrs: Map<String, Value>,
) -> Result<T, ServiceError> {
    let parent_kind = T::KIND
        .parents()
        .iter()
        .find(|(field, _)| *field == parent_field)
        .map(|(_, kind)| *kind)
        .ok_or_else(|| ServiceError::Validation(format!("{} has no parent {parent_field}", T::KIND)))?;
    ensure_exists(s, parent_kind, parent_id).await?;
    attrs.insert(parent_field.to_string(), Value::String(parent_id.to_string()));
    create::<T>(s, attrs).await
}

/// Apply the mutable subset of `attrs` to an existing `T`.
pub async fn update<T: Resource>(s: &mut dyn Session, id: &str, attrs: &Map<String, Value>) -> Result<T, ServiceError> {
    let mut item = get::<T>(s, id).await?;
    item.apply_update(attrs)?;
    item.touch();
    s.new(item.clone().into_entity()).await?;
    s.save().await?;
    Ok(item)
}

pub async fn remove<T: Resource>(s: &mut dyn Session, id: &str) -> Result<(), ServiceError> {
    let item = get::<T>(s, id).await?;
    s.delete(&item.into_entity()).await?;
    s.save().await?;
    info!(event = "deleted", class = %T::KIND, id = %id);
    Ok(())
}

/// Count per collection name.
pub async fn stats(s: &mut dyn Session) -> Result<BTreeMap<&'static str, usize>, ServiceError> {
    let mut out = BTreeMap::new();
    for kind in EntityKind::ALL {
        out.insert(kind.collection(), s.count(Some(kind)).await?);
    }
    Ok(out)
}
