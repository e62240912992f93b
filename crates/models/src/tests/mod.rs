/// Construction, update and rendering rules of the entity types
pub mod entity_tests;

/// Relational schema: migrations, row mapping, join table and transactions
pub mod schema_tests;
