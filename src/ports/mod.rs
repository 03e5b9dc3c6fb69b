//! Ports (trait boundaries) for external dependencies.
//!
//! The learning core owns these traits; storage and presentation live in
//! adapters and observers that implement them.

pub mod observer;
pub mod repository;

pub use observer::Observer;
pub use repository::ValueTableRepository;
