use sea_orm::{entity::prelude::*, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "place_amenity")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub place_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub amenity_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Place,
    Amenity,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Place => Entity::belongs_to(super::place::Entity)
                .from(Column::PlaceId)
                .to(super::place::Column::Id)
                .into(),
            Relation::Amenity => Entity::belongs_to(super::amenity::Entity)
                .from(Column::AmenityId)
                .to(super::amenity::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn link(place_id: &str, amenity_id: &str) -> ActiveModel {
    ActiveModel { place_id: Set(place_id.to_string()), amenity_id: Set(amenity_id.to_string()) }
}
