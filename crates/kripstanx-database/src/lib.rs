//! # kripstanx-database
//!
//! Store interfaces for user records and the audit log, with a PostgreSQL
//! implementation and an in-memory one for tests and single-node runs.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use memory::{MemoryAuditEventRepository, MemoryUserRepository};
pub use repositories::{
    AuditEventRepository, PgAuditEventRepository, PgUserRepository, UserRepository,
};
