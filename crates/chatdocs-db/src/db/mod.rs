//! Database repositories for the data access layer
//!
//! Each repository is responsible for a specific domain entity and provides
//! CRUD operations and specialized queries.

pub mod files;
pub mod pool;
