use sea_orm::{entity::prelude::*, Set};
use serde::{Deserialize, Serialize};

use crate::base::BaseModel;
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "amenities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub extra: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match *self {}
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_domain(self) -> Result<crate::Amenity, ModelError> {
        Ok(crate::Amenity {
            base: BaseModel {
                id: self.id,
                created_at: self.created_at,
                updated_at: self.updated_at,
                extra: super::decode_extra(self.extra)?,
            },
            name: self.name,
        })
    }
}

pub fn active_model(a: &crate::Amenity) -> ActiveModel {
    ActiveModel {
        id: Set(a.base.id.clone()),
        name: Set(a.name.clone()),
        created_at: Set(a.base.created_at),
        updated_at: Set(a.base.updated_at),
        extra: Set(super::encode_extra(&a.base.extra)),
    }
}
