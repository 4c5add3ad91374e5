//! Utilities
//!
//! Error types and filesystem locations shared by the application.

pub mod error;
pub mod paths;

pub use error::*;
pub use paths::*;
