//! Storage engine
//!
//! One contract, two backends. A [`Storage`] is chosen once at startup by [`connect`] and shared by
//! every request; each request works through its own [`Session`], which stages writes until
//! [`Session::save`] and discards whatever is left when it closes.

pub mod db;
pub mod file;
pub mod json_map_store;

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use configs::{AppConfig, StorageMode};
use models::{Amenity, Entity, EntityKind, Place, Resource};
use tracing::info;

use crate::errors::ServiceError;

pub use db::DbStorage;
pub use file::FileStorage;

/// Process-wide storage handle.
pub type DynStorage = Arc<dyn Storage>;

#[async_trait]
pub trait Storage: Send + Sync {
    fn mode(&self) -> StorageMode;

    /// Start a unit of work.
    async fn open(&self) -> Result<Box<dyn Session>, ServiceError>;
}

/// A unit of work against the storage engine.
///
/// Reads observe the session's own staged writes; other sessions only see what has been saved.
#[async_trait]
pub trait Session: Send {
    /// Every stored entity of `kind` (all kinds when `None`), keyed `<Class>.<id>`.
    async fn all(&mut self, kind: Option<EntityKind>) -> Result<BTreeMap<String, Entity>, ServiceError>;

    async fn get(&mut self, kind: EntityKind, id: &str) -> Result<Option<Entity>, ServiceError>;

    async fn count(&mut self, kind: Option<EntityKind>) -> Result<usize, ServiceError> {
        Ok(self.all(kind).await?.len())
    }

    /// Stage a new or modified entity.
    async fn new(&mut self, entity: Entity) -> Result<(), ServiceError>;

    /// Stage the removal of an entity.
    async fn delete(&mut self, entity: &Entity) -> Result<(), ServiceError>;

    /// Durably persist everything staged so far.
    async fn save(&mut self) -> Result<(), ServiceError>;

    /// Release backend resources, discarding unsaved work.
    async fn close(&mut self) -> Result<(), ServiceError>;

    /// Amenities linked to `place`. Ids that no longer resolve are skipped.
    async fn amenities_of(&mut self, place: &Place) -> Result<Vec<Amenity>, ServiceError> {
        let mut out = Vec::with_capacity(place.amenity_ids.len());
        for id in place.amenity_ids.iter() {
            if let Some(amenity) = self.get(EntityKind::Amenity, id).await?.and_then(Amenity::from_entity) {
                out.push(amenity);
            }
        }
        Ok(out)
    }
}

/// Future returned by the body passed to [`scoped`].
pub type SessionFuture<'s, T> = Pin<Box<dyn Future<Output = Result<T, ServiceError>> + Send + 's>>;

/// Run `f` inside a fresh session and close it afterwards, whatever `f` returned.
///
/// ```ignore
/// let states = scoped(storage.as_ref(), |s| Box::pin(async move { resources::list::<State>(s).await })).await?;
/// ```
pub async fn scoped<T, F>(storage: &dyn Storage, f: F) -> Result<T, ServiceError>
where
    T: Send,
    F: for<'s> FnOnce(&'s mut dyn Session) -> SessionFuture<'s, T> + Send,
{
    let mut session = storage.open().await?;
    let out = f(&mut *session).await;
    let closed = session.close().await;
    match (out, closed) {
        (Err(e), _) => Err(e),
        (Ok(_), Err(e)) => Err(e),
        (Ok(v), Ok(())) => Ok(v),
    }
}

/// Build the backend selected by configuration.
pub async fn connect(cfg: &AppConfig) -> Result<DynStorage, ServiceError> {
    let storage: DynStorage = match cfg.storage.mode {
        StorageMode::File => Arc::new(FileStorage::open_path(&cfg.storage.file_path).await?),
        StorageMode::Db => Arc::new(DbStorage::connect(&cfg.database).await?),
    };
    info!(service = "storage", mode = %storage.mode(), "storage engine ready");
    Ok(storage)
}
