//! Services
//!
//! Business logic services for the application.

pub mod requirements;

pub use requirements::{RequirementsEngine, RequirementsSession};
