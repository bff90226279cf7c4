//! In-memory stores for tests and single-node deployments.
//!
//! State lives only as long as the process.

pub mod audit;
pub mod user;

pub use audit::MemoryAuditEventRepository;
pub use user::MemoryUserRepository;
