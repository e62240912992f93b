//! Service layer: the dual-mode storage engine and the operations the HTTP layer drives.
//! - `storage` hides the backend behind per-request sessions.
//! - `relations` resolves links between entities the same way on both backends.
//! - `resources` implements list/create/get/update/delete generically over entity types.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod relations;
pub mod resources;
#[cfg(test)]
pub mod test_support;
