/// Database layer
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with health check
/// - `migrations`: embedded schema migrations
/// - `store`: the [`Store`](store::Store) port and its PostgreSQL adapter
/// - `memory`: in-memory [`Store`](store::Store) adapter

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod store;

pub use memory::MemoryStore;
pub use store::{PgStore, Store, StoreError, StoreResult};
