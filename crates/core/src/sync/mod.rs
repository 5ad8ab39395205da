//! Product synchronization against the remote catalog.

pub mod ports;
pub mod service;

pub use ports::ProductRepository;
pub use service::SyncEngine;
