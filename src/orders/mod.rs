//! Orders: the data model and the store that owns it.

pub mod model;
pub mod store;

pub use model::{Actor, Claim, Order};
pub use store::{CreatePolicy, OrderStats, OrderStore, Released};
