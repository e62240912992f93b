use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Foreign-key columns scanned by the relationship lookups
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_city_state")
                    .table(Cities::Table)
                    .col(Cities::StateId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_place_city")
                    .table(Places::Table)
                    .col(Places::CityId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_review_place")
                    .table(Reviews::Table)
                    .col(Reviews::PlaceId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_place_amenity_amenity")
                    .table(PlaceAmenity::Table)
                    .col(PlaceAmenity::AmenityId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_city_state").table(Cities::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_place_city").table(Places::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_review_place").table(Reviews::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_place_amenity_amenity").table(PlaceAmenity::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Cities { Table, StateId }

#[derive(DeriveIden)]
enum Places { Table, CityId }

#[derive(DeriveIden)]
enum Reviews { Table, PlaceId }

#[derive(DeriveIden)]
enum PlaceAmenity { Table, AmenityId }
