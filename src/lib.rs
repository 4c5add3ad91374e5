//! Agent Blueprint
//!
//! Conversational requirements gathering for multi-agent system designs.
//! It includes:
//! - The requirements conversation engine and an in-memory session
//! - Prompt composition over a data-driven schema
//! - Configuration storage
//! - Data models and utilities
//!
//! Schema, specification and suggestion logic live in `agent-blueprint-core`;
//! backend access and reply decoding live in `agent-blueprint-llm`.

pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use models::settings::{AppConfig, SettingsUpdate};
pub use services::requirements::{
    HistoryEntry, PromptComposer, RequirementsEngine, RequirementsSession, TurnOutcome,
    FALLBACK_REPLY,
};
pub use storage::config::ConfigService;
pub use utils::error::{AppError, AppResult};
