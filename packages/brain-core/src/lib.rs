//! Board store for the Digital Brain kanban: types, snapshot persistence,
//! mutations, and the projections built on top of them.
pub mod dates;
pub mod events;
pub mod ids;
pub mod positions;
pub mod search;
pub mod stats;
pub mod storage;
pub mod store;
pub mod types;

pub use store::BoardStore;
