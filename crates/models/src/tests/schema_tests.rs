use crate::db::{connect_and_migrate, DatabaseConfig};
use crate::schema::{amenity, city, place, place_amenity, state, user};
use crate::{AmenityIds, Resource};
use anyhow::Result;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait, TransactionTrait};
use serde_json::{json, Map, Value};

/// Setup an in-memory database with the full schema
async fn setup_test_db() -> Result<DatabaseConnection> {
    let cfg = DatabaseConfig { url: "sqlite::memory:".into(), ..Default::default() };
    connect_and_migrate(&cfg).await
}

fn attrs(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(m) => m,
        other => panic!("expected object, got {other}"),
    }
}

/// State -> City, plus a User: the parents a Place row needs
async fn seed_parents(db: &DatabaseConnection) -> Result<(crate::City, crate::User)> {
    let s = crate::State::from_attrs(attrs(json!({"name": "California"})))?;
    state::active_model(&s).insert(db).await?;
    let c = crate::City::from_attrs(attrs(json!({"name": "San Francisco", "state_id": s.id()})))?;
    city::active_model(&c).insert(db).await?;
    let u = crate::User::from_attrs(attrs(json!({"email": "host@example.com", "password": "pw"})))?;
    user::active_model(&u).insert(db).await?;
    Ok((c, u))
}

#[tokio::test]
async fn test_state_row_round_trip() -> Result<()> {
    let db = setup_test_db().await?;

    let s = crate::State::from_attrs(attrs(json!({"name": "Oregon", "motto": "She flies with her own wings"})))?;
    state::active_model(&s).insert(&db).await?;

    let found = state::Entity::find_by_id(s.id().to_string()).one(&db).await?.expect("state row");
    assert_eq!(found.extra.as_deref(), Some(r#"{"motto":"She flies with her own wings"}"#));
    assert_eq!(found.into_domain()?, s);
    Ok(())
}

#[tokio::test]
async fn test_place_amenity_join_and_cascade() -> Result<()> {
    let db = setup_test_db().await?;
    let (c, u) = seed_parents(&db).await?;

    let wifi = crate::Amenity::from_attrs(attrs(json!({"name": "Wifi"})))?;
    amenity::active_model(&wifi).insert(&db).await?;

    let p = crate::Place::from_attrs(attrs(json!({"name": "Loft", "city_id": c.id(), "user_id": u.id()})))?;
    let row = place::active_model(&p).insert(&db).await?;
    place_amenity::link(p.id(), wifi.id()).insert(&db).await?;

    let linked = row.find_related(amenity::Entity).all(&db).await?;
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].id, wifi.base.id);

    let ids: AmenityIds = linked.iter().map(|a| a.id.clone()).collect();
    let domain = row.clone().into_domain(ids)?;
    assert!(domain.amenity_ids.contains(wifi.id()));

    // join rows go with the place
    place::Entity::delete_by_id(p.id().to_string()).exec(&db).await?;
    assert_eq!(place_amenity::Entity::find().count(&db).await?, 0);
    assert!(amenity::Entity::find_by_id(wifi.id().to_string()).one(&db).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_duplicate_link_rejected_by_primary_key() -> Result<()> {
    let db = setup_test_db().await?;
    let (c, u) = seed_parents(&db).await?;
    let a = crate::Amenity::from_attrs(attrs(json!({"name": "Pool"})))?;
    amenity::active_model(&a).insert(&db).await?;
    let p = crate::Place::from_attrs(attrs(json!({"name": "Villa", "city_id": c.id(), "user_id": u.id()})))?;
    place::active_model(&p).insert(&db).await?;

    place_amenity::link(p.id(), a.id()).insert(&db).await?;
    assert!(place_amenity::link(p.id(), a.id()).insert(&db).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_transaction_rollback() -> Result<()> {
    let db = setup_test_db().await?;

    let s = crate::State::from_attrs(attrs(json!({"name": "Utah"})))?;
    let txn = db.begin().await?;
    state::active_model(&s).insert(&txn).await?;
    txn.rollback().await?;

    assert!(state::Entity::find_by_id(s.id().to_string()).one(&db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_deleting_state_cascades_to_cities() -> Result<()> {
    let db = setup_test_db().await?;
    let (c, _u) = seed_parents(&db).await?;

    state::Entity::delete_by_id(c.state_id.clone()).exec(&db).await?;
    assert!(city::Entity::find_by_id(c.id().to_string()).one(&db).await?.is_none());
    Ok(())
}
