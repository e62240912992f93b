//! File-backed storage: the object graph in memory, mirrored to one JSON file.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use configs::StorageMode;
use models::{Entity, EntityKind};
use tracing::{debug, info};

use super::json_map_store::JsonMapStore;
use super::{Session, Storage};
use crate::errors::ServiceError;

type Graph = JsonMapStore<String, Entity>;

/// Shared graph; sessions stage on top of it.
#[derive(Clone)]
pub struct FileStorage {
    graph: Arc<Graph>,
}

impl FileStorage {
    /// Load (or create) the snapshot at `path`.
    pub async fn open_path<P: Into<PathBuf>>(path: P) -> Result<Self, ServiceError> {
        let graph = Graph::new(path).await?;
        let loaded = graph.filtered(|_, _| true).await.len();
        info!(service = "storage", file = %graph.path().display(), objects = loaded, "file storage loaded");
        Ok(Self { graph })
    }

    pub fn path(&self) -> &Path {
        self.graph.path()
    }
}

#[async_trait]
impl Storage for FileStorage {
    fn mode(&self) -> StorageMode {
        StorageMode::File
    }

    async fn open(&self) -> Result<Box<dyn Session>, ServiceError> {
        debug!(event = "session_open", mode = "file");
        Ok(Box::new(FileSession {
            graph: self.graph.clone(),
            staged: BTreeMap::new(),
            removed: BTreeSet::new(),
        }))
    }
}

/// Pending upserts and removals, invisible to other sessions until saved.
pub struct FileSession {
    graph: Arc<Graph>,
    staged: BTreeMap<String, Entity>,
    removed: BTreeSet<String>,
}

fn of_kind(kind: Option<EntityKind>, entity: &Entity) -> bool {
    kind.map_or(true, |k| entity.kind() == k)
}

/// Drop `amenity_id` from a place's links; `true` when it was linked.
fn unlink(entity: &mut Entity, amenity_id: &str) -> bool {
    match entity {
        Entity::Place(p) => p.amenity_ids.remove(amenity_id),
        _ => false,
    }
}

/// Id of the amenity stored under `key`, if the key names one.
fn amenity_id(key: &str) -> Option<&str> {
    key.strip_prefix(EntityKind::Amenity.class_name())?.strip_prefix('.')
}

#[async_trait]
impl Session for FileSession {
    async fn all(&mut self, kind: Option<EntityKind>) -> Result<BTreeMap<String, Entity>, ServiceError> {
        let removed = &self.removed;
        let mut out = self
            .graph
            .filtered(|key, entity| of_kind(kind, entity) && !removed.contains(key))
            .await;
        for (key, entity) in &self.staged {
            if of_kind(kind, entity) {
                out.insert(key.clone(), entity.clone());
            }
        }
        Ok(out)
    }

    async fn get(&mut self, kind: EntityKind, id: &str) -> Result<Option<Entity>, ServiceError> {
        let key = kind.storage_key(id);
        if self.removed.contains(&key) {
            return Ok(None);
        }
        if let Some(entity) = self.staged.get(&key) {
            return Ok(Some(entity.clone()));
        }
        Ok(self.graph.get(&key).await)
    }

    async fn new(&mut self, entity: Entity) -> Result<(), ServiceError> {
        let key = entity.storage_key();
        self.removed.remove(&key);
        self.staged.insert(key, entity);
        Ok(())
    }

    async fn delete(&mut self, entity: &Entity) -> Result<(), ServiceError> {
        // a removed amenity leaves no link behind, same as the join-table cascade
        if entity.kind() == EntityKind::Amenity {
            for (key, mut place) in self.all(Some(EntityKind::Place)).await? {
                if unlink(&mut place, entity.id()) {
                    self.staged.insert(key, place);
                }
            }
        }
        let key = entity.storage_key();
        self.staged.remove(&key);
        self.removed.insert(key);
        Ok(())
    }

    async fn save(&mut self) -> Result<(), ServiceError> {
        if self.staged.is_empty() && self.removed.is_empty() {
            return Ok(());
        }
        let (staged, removed) = (&self.staged, &self.removed);
        let total = self
            .graph
            .update_map(|map| {
                for key in removed {
                    map.remove(key);
                }
                for (key, entity) in staged {
                    map.insert(key.clone(), entity.clone());
                }
                // links saved by other sessions since this one staged its removals
                let gone: Vec<&str> = removed.iter().filter_map(|key| amenity_id(key)).collect();
                if !gone.is_empty() {
                    for entity in map.values_mut() {
                        for id in &gone {
                            unlink(entity, id);
                        }
                    }
                }
                Ok(map.len())
            })
            .await?;
        debug!(event = "save", mode = "file", upserts = staged.len(), removals = removed.len(), objects = total);
        self.staged.clear();
        self.removed.clear();
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ServiceError> {
        if !self.staged.is_empty() || !self.removed.is_empty() {
            debug!(event = "session_discard", mode = "file", upserts = self.staged.len(), removals = self.removed.len());
        }
        self.staged.clear();
        self.removed.clear();
        debug!(event = "session_close", mode = "file");
        Ok(())
    }
}
