use sea_orm::{entity::prelude::*, Set};
use serde::{Deserialize, Serialize};

use crate::base::BaseModel;
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub state_id: String,
    pub name: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub extra: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    State,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::State => Entity::belongs_to(super::state::Entity)
                .from(Column::StateId)
                .to(super::state::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_domain(self) -> Result<crate::City, ModelError> {
        Ok(crate::City {
            base: BaseModel {
                id: self.id,
                created_at: self.created_at,
                updated_at: self.updated_at,
                extra: super::decode_extra(self.extra)?,
            },
            name: self.name,
            state_id: self.state_id,
        })
    }
}

pub fn active_model(c: &crate::City) -> ActiveModel {
    ActiveModel {
        id: Set(c.base.id.clone()),
        state_id: Set(c.state_id.clone()),
        name: Set(c.name.clone()),
        created_at: Set(c.base.created_at),
        updated_at: Set(c.base.updated_at),
        extra: Set(super::encode_extra(&c.base.extra)),
    }
}
