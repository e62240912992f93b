use service::storage::DynStorage;

/// Shared by every handler; the storage mode behind it is fixed at startup.
#[derive(Clone)]
pub struct AppState {
    pub storage: DynStorage,
}

impl AppState {
    pub fn new(storage: DynStorage) -> Self {
        Self { storage }
    }
}
