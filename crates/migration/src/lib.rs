//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_state;
mod m20240101_000002_create_amenity;
mod m20240101_000003_create_user;
mod m20240101_000004_create_city;
mod m20240101_000005_create_place;
mod m20240101_000006_create_review;
mod m20240101_000007_create_place_amenity;
mod m20240101_000008_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_state::Migration),
            Box::new(m20240101_000002_create_amenity::Migration),
            Box::new(m20240101_000003_create_user::Migration),
            Box::new(m20240101_000004_create_city::Migration),
            Box::new(m20240101_000005_create_place::Migration),
            Box::new(m20240101_000006_create_review::Migration),
            Box::new(m20240101_000007_create_place_amenity::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000008_add_indexes::Migration),
        ]
    }
}
