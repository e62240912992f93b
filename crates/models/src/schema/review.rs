use sea_orm::{entity::prelude::*, Set};
use serde::{Deserialize, Serialize};

use crate::base::BaseModel;
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub place_id: String,
    pub user_id: String,
    pub text: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub extra: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Place,
    User,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Place => Entity::belongs_to(super::place::Entity)
                .from(Column::PlaceId)
                .to(super::place::Column::Id)
                .into(),
            Relation::User => Entity::belongs_to(super::user::Entity)
                .from(Column::UserId)
                .to(super::user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_domain(self) -> Result<crate::Review, ModelError> {
        Ok(crate::Review {
            base: BaseModel {
                id: self.id,
                created_at: self.created_at,
                updated_at: self.updated_at,
                extra: super::decode_extra(self.extra)?,
            },
            place_id: self.place_id,
            user_id: self.user_id,
            text: self.text,
        })
    }
}

pub fn active_model(r: &crate::Review) -> ActiveModel {
    ActiveModel {
        id: Set(r.base.id.clone()),
        place_id: Set(r.place_id.clone()),
        user_id: Set(r.user_id.clone()),
        text: Set(r.text.clone()),
        created_at: Set(r.base.created_at),
        updated_at: Set(r.base.updated_at),
        extra: Set(super::encode_extra(&r.base.extra)),
    }
}
