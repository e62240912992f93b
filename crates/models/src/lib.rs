//! Entity model shared by both storage backends: identity rules, per-type attribute sets,
//! canonical JSON rendering, and the relational schema the database backend maps them to.

pub mod errors;
pub mod base;
pub mod kind;
pub mod entity;
pub mod schema;
pub mod db;

pub use base::BaseModel;
pub use entity::{Amenity, AmenityIds, City, Entity, Place, Resource, Review, State, User};
pub use kind::EntityKind;

#[cfg(test)]
mod tests;
