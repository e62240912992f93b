use sea_orm::{entity::prelude::*, Set};
use serde::{Deserialize, Serialize};

use crate::base::BaseModel;
use crate::entity::AmenityIds;
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "places")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub city_id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub number_rooms: i32,
    pub number_bathrooms: i32,
    pub max_guest: i32,
    pub price_by_night: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub extra: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    City,
    User,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::City => Entity::belongs_to(super::city::Entity)
                .from(Column::CityId)
                .to(super::city::Column::Id)
                .into(),
            Relation::User => Entity::belongs_to(super::user::Entity)
                .from(Column::UserId)
                .to(super::user::Column::Id)
                .into(),
        }
    }
}

// Many-to-many through the `place_amenity` join table.
impl Related<super::amenity::Entity> for Entity {
    fn to() -> RelationDef {
        super::place_amenity::Relation::Amenity.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::place_amenity::Relation::Place.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The join table is not part of the row; callers pass the linked ids they loaded.
    pub fn into_domain(self, amenity_ids: AmenityIds) -> Result<crate::Place, ModelError> {
        Ok(crate::Place {
            base: BaseModel {
                id: self.id,
                created_at: self.created_at,
                updated_at: self.updated_at,
                extra: super::decode_extra(self.extra)?,
            },
            city_id: self.city_id,
            user_id: self.user_id,
            name: self.name,
            description: self.description,
            number_rooms: self.number_rooms,
            number_bathrooms: self.number_bathrooms,
            max_guest: self.max_guest,
            price_by_night: self.price_by_night,
            latitude: self.latitude,
            longitude: self.longitude,
            amenity_ids,
        })
    }
}

pub fn active_model(p: &crate::Place) -> ActiveModel {
    ActiveModel {
        id: Set(p.base.id.clone()),
        city_id: Set(p.city_id.clone()),
        user_id: Set(p.user_id.clone()),
        name: Set(p.name.clone()),
        description: Set(p.description.clone()),
        number_rooms: Set(p.number_rooms),
        number_bathrooms: Set(p.number_bathrooms),
        max_guest: Set(p.max_guest),
        price_by_night: Set(p.price_by_night),
        latitude: Set(p.latitude),
        longitude: Set(p.longitude),
        created_at: Set(p.base.created_at),
        updated_at: Set(p.base.updated_at),
        extra: Set(super::encode_extra(&p.base.extra)),
    }
}
