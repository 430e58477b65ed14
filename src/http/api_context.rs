use crate::models::DynStore;

/// Shared state for every handler.
///
/// Nothing in here is mutable; each request borrows the store handle and is otherwise
/// independent of every other request.
#[derive(Clone)]
pub struct ApiContext {
    pub store: DynStore,
}
