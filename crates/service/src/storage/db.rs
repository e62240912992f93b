//! Relational storage through sea-orm.
//!
//! Every session runs inside one transaction, begun on first use: staged writes are real writes
//! inside it, `save` commits and `close` rolls back whatever was not committed.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use configs::{DatabaseConfig, StorageMode};
use models::schema::{amenity, city, place, place_amenity, review, state, user};
use models::{Amenity, AmenityIds, Entity, EntityKind, Place};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, TransactionTrait,
};
use tracing::{debug, warn};

use super::{Session, Storage};
use crate::errors::ServiceError;

pub struct DbStorage {
    db: DatabaseConnection,
}

impl DbStorage {
    /// Connect with the configured pool and create the schema if it is missing.
    pub async fn connect(cfg: &DatabaseConfig) -> Result<Self, ServiceError> {
        let db = models::db::connect_and_migrate(cfg)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(Self { db })
    }
}

#[async_trait]
impl Storage for DbStorage {
    fn mode(&self) -> StorageMode {
        StorageMode::Db
    }

    async fn open(&self) -> Result<Box<dyn Session>, ServiceError> {
        debug!(event = "session_open", mode = "db");
        Ok(Box::new(DbSession { db: self.db.clone(), txn: None }))
    }
}

pub struct DbSession {
    db: DatabaseConnection,
    txn: Option<DatabaseTransaction>,
}

impl DbSession {
    async fn txn(&mut self) -> Result<&DatabaseTransaction, ServiceError> {
        if self.txn.is_none() {
            self.txn = Some(self.db.begin().await?);
        }
        self.txn.as_ref().ok_or_else(|| ServiceError::Db("transaction unavailable".into()))
    }
}

/// Domain rows of one table, mapped through the schema module's `into_domain`.
macro_rules! rows {
    ($txn:expr, $module:ident) => {
        $module::Entity::find()
            .all($txn)
            .await?
            .into_iter()
            .map(|m| m.into_domain().map(Entity::from))
            .collect::<Result<Vec<_>, _>>()?
    };
}

macro_rules! row {
    ($txn:expr, $module:ident, $id:expr) => {
        match $module::Entity::find_by_id($id.to_string()).one($txn).await? {
            Some(m) => Some(Entity::from(m.into_domain()?)),
            None => None,
        }
    };
}

/// Insert or update a row from its domain value.
macro_rules! upsert {
    ($txn:expr, $module:ident, $value:expr) => {{
        let exists = $module::Entity::find_by_id($value.base.id.clone()).one($txn).await?.is_some();
        let am = $module::active_model($value);
        if exists {
            am.update($txn).await?;
        } else {
            am.insert($txn).await?;
        }
    }};
}

async fn linked_ids(txn: &DatabaseTransaction, place_id: &str) -> Result<AmenityIds, ServiceError> {
    Ok(place_amenity::Entity::find()
        .filter(place_amenity::Column::PlaceId.eq(place_id))
        .all(txn)
        .await?
        .into_iter()
        .map(|link| link.amenity_id)
        .collect())
}

async fn places(txn: &DatabaseTransaction) -> Result<Vec<Entity>, ServiceError> {
    let mut links: HashMap<String, Vec<String>> = HashMap::new();
    for link in place_amenity::Entity::find().all(txn).await? {
        links.entry(link.place_id).or_default().push(link.amenity_id);
    }
    let mut out = Vec::new();
    for m in place::Entity::find().all(txn).await? {
        let ids: AmenityIds = links.remove(&m.id).unwrap_or_default().into_iter().collect();
        out.push(Entity::from(m.into_domain(ids)?));
    }
    Ok(out)
}

async fn load_kind(txn: &DatabaseTransaction, kind: EntityKind) -> Result<Vec<Entity>, ServiceError> {
    Ok(match kind {
        EntityKind::Amenity => rows!(txn, amenity),
        EntityKind::City => rows!(txn, city),
        EntityKind::Place => places(txn).await?,
        EntityKind::Review => rows!(txn, review),
        EntityKind::State => rows!(txn, state),
        EntityKind::User => rows!(txn, user),
    })
}

/// Make the join rows of `p` match its `amenity_ids`.
async fn sync_links(txn: &DatabaseTransaction, p: &Place) -> Result<(), ServiceError> {
    let current: BTreeSet<String> = linked_ids(txn, p.base.id.as_str()).await?.iter().map(str::to_string).collect();
    for gone in current.iter().filter(|id| !p.amenity_ids.contains(id)) {
        place_amenity::Entity::delete_many()
            .filter(place_amenity::Column::PlaceId.eq(p.base.id.as_str()))
            .filter(place_amenity::Column::AmenityId.eq(gone.as_str()))
            .exec(txn)
            .await?;
    }
    for added in p.amenity_ids.iter().filter(|id| !current.contains(*id)) {
        place_amenity::link(&p.base.id, added).insert(txn).await?;
    }
    Ok(())
}

#[async_trait]
impl Session for DbSession {
    async fn all(&mut self, kind: Option<EntityKind>) -> Result<BTreeMap<String, Entity>, ServiceError> {
        let txn = self.txn().await?;
        let kinds: Vec<EntityKind> = match kind {
            Some(k) => vec![k],
            None => EntityKind::ALL.to_vec(),
        };
        let mut out = BTreeMap::new();
        for k in kinds {
            for entity in load_kind(txn, k).await? {
                out.insert(entity.storage_key(), entity);
            }
        }
        Ok(out)
    }

    async fn get(&mut self, kind: EntityKind, id: &str) -> Result<Option<Entity>, ServiceError> {
        let txn = self.txn().await?;
        Ok(match kind {
            EntityKind::Amenity => row!(txn, amenity, id),
            EntityKind::City => row!(txn, city, id),
            EntityKind::Place => match place::Entity::find_by_id(id.to_string()).one(txn).await? {
                Some(m) => Some(Entity::from(m.into_domain(linked_ids(txn, id).await?)?)),
                None => None,
            },
            EntityKind::Review => row!(txn, review, id),
            EntityKind::State => row!(txn, state, id),
            EntityKind::User => row!(txn, user, id),
        })
    }

    async fn count(&mut self, kind: Option<EntityKind>) -> Result<usize, ServiceError> {
        let txn = self.txn().await?;
        let kinds: Vec<EntityKind> = match kind {
            Some(k) => vec![k],
            None => EntityKind::ALL.to_vec(),
        };
        let mut total = 0u64;
        for k in kinds {
            total += match k {
                EntityKind::Amenity => amenity::Entity::find().count(txn).await?,
                EntityKind::City => city::Entity::find().count(txn).await?,
                EntityKind::Place => place::Entity::find().count(txn).await?,
                EntityKind::Review => review::Entity::find().count(txn).await?,
                EntityKind::State => state::Entity::find().count(txn).await?,
                EntityKind::User => user::Entity::find().count(txn).await?,
            };
        }
        Ok(total as usize)
    }

    async fn new(&mut self, entity: Entity) -> Result<(), ServiceError> {
        let txn = self.txn().await?;
        match &entity {
            Entity::Amenity(a) => upsert!(txn, amenity, a),
            Entity::City(c) => upsert!(txn, city, c),
            Entity::Place(p) => {
                upsert!(txn, place, p);
                sync_links(txn, p).await?;
            }
            Entity::Review(r) => upsert!(txn, review, r),
            Entity::State(s) => upsert!(txn, state, s),
            Entity::User(u) => upsert!(txn, user, u),
        }
        Ok(())
    }

    async fn delete(&mut self, entity: &Entity) -> Result<(), ServiceError> {
        let txn = self.txn().await?;
        let id = entity.id().to_string();
        // dependents and join rows go through ON DELETE CASCADE
        let res = match entity.kind() {
            EntityKind::Amenity => amenity::Entity::delete_by_id(id).exec(txn).await?,
            EntityKind::City => city::Entity::delete_by_id(id).exec(txn).await?,
            EntityKind::Place => place::Entity::delete_by_id(id).exec(txn).await?,
            EntityKind::Review => review::Entity::delete_by_id(id).exec(txn).await?,
            EntityKind::State => state::Entity::delete_by_id(id).exec(txn).await?,
            EntityKind::User => user::Entity::delete_by_id(id).exec(txn).await?,
        };
        if res.rows_affected == 0 {
            debug!(event = "delete_missing", key = %entity.storage_key());
        }
        Ok(())
    }

    async fn save(&mut self) -> Result<(), ServiceError> {
        if let Some(txn) = self.txn.take() {
            txn.commit().await?;
            debug!(event = "save", mode = "db");
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ServiceError> {
        if let Some(txn) = self.txn.take() {
            if let Err(e) = txn.rollback().await {
                warn!(event = "rollback_failed", error = %e);
                return Err(e.into());
            }
        }
        debug!(event = "session_close", mode = "db");
        Ok(())
    }

    async fn amenities_of(&mut self, p: &Place) -> Result<Vec<Amenity>, ServiceError> {
        let txn = self.txn().await?;
        let Some(row) = place::Entity::find_by_id(p.base.id.clone()).one(txn).await? else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        for m in row.find_related(amenity::Entity).all(txn).await? {
            out.push(m.into_domain()?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::scoped;
    use crate::test_support::{attrs, db_storage, sqlite_memory};
    use models::{City, Resource, State, User};
    use serde_json::json;

    struct Seed {
        place: Place,
        wifi: Amenity,
        pool: Amenity,
    }

    fn seed() -> anyhow::Result<(Vec<Entity>, Seed)> {
        let s = State::from_attrs(attrs(json!({"name": "Colorado"})))?;
        let c = City::from_attrs(attrs(json!({"name": "Denver", "state_id": s.id()})))?;
        let u = User::from_attrs(attrs(json!({"email": "a@b.c", "password": "pw"})))?;
        let wifi = Amenity::from_attrs(attrs(json!({"name": "Wifi"})))?;
        let pool = Amenity::from_attrs(attrs(json!({"name": "Pool"})))?;
        let mut place = Place::from_attrs(attrs(json!({"name": "Cabin", "city_id": c.id(), "user_id": u.id()})))?;
        place.amenity_ids.insert(wifi.id());
        place.amenity_ids.insert(pool.id());
        let rows = vec![
            s.into_entity(),
            c.into_entity(),
            u.into_entity(),
            wifi.clone().into_entity(),
            pool.clone().into_entity(),
            place.clone().into_entity(),
        ];
        Ok((rows, Seed { place, wifi, pool }))
    }

    #[tokio::test]
    async fn place_links_follow_amenity_ids() -> anyhow::Result<()> {
        let storage = db_storage().await?;
        let (rows, Seed { mut place, wifi, pool }) = seed()?;
        let stored = place.clone();
        scoped(storage.as_ref(), |sess| Box::pin(async move {
            for row in rows {
                sess.new(row).await?;
            }
            sess.save().await
        }))
        .await?;

        let linked = scoped(storage.as_ref(), |sess| Box::pin(async move { sess.amenities_of(&stored).await })).await?;
        assert_eq!(linked.len(), 2);

        // dropping one id from the set removes its join row on upsert
        place.amenity_ids.remove(wifi.id());
        let id = place.id().to_string();
        let entity = place.into_entity();
        let reloaded = scoped(storage.as_ref(), |sess| Box::pin(async move {
            sess.new(entity).await?;
            sess.save().await?;
            sess.get(EntityKind::Place, &id).await
        }))
        .await?
        .and_then(Place::from_entity)
        .expect("place");
        let ids: Vec<&str> = reloaded.amenity_ids.iter().collect();
        assert_eq!(ids, vec![pool.id()]);
        Ok(())
    }

    #[tokio::test]
    async fn deleting_place_cascades_join_rows() -> anyhow::Result<()> {
        let storage = DbStorage::connect(&sqlite_memory()).await?;
        let (rows, Seed { place, .. }) = seed()?;
        let entity = place.into_entity();
        let amenities = scoped(&storage, |sess| Box::pin(async move {
            for row in rows {
                sess.new(row).await?;
            }
            sess.save().await?;
            sess.delete(&entity).await?;
            sess.save().await?;
            sess.count(Some(EntityKind::Amenity)).await
        }))
        .await?;
        assert_eq!(amenities, 2);
        assert_eq!(place_amenity::Entity::find().count(&storage.db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn failed_write_rolls_back_session() -> anyhow::Result<()> {
        let storage = db_storage().await?;
        let s = State::from_attrs(attrs(json!({"name": "Georgia"})))?;
        // a city whose state does not exist violates the foreign key
        let orphan = City::from_attrs(attrs(json!({"name": "Nowhere", "state_id": "missing"})))?;
        let (state_entity, orphan_entity) = (s.into_entity(), orphan.into_entity());
        let res = scoped(storage.as_ref(), |sess| Box::pin(async move {
            sess.new(state_entity).await?;
            sess.new(orphan_entity).await?;
            sess.save().await
        }))
        .await;
        assert!(matches!(res, Err(ServiceError::Db(_))));

        let total = scoped(storage.as_ref(), |sess| Box::pin(async move { sess.count(None).await })).await?;
        assert_eq!(total, 0);
        Ok(())
    }
}
