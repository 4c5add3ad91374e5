//! Requirements Conversation Service
//!
//! Turn-by-turn requirements gathering for multi-agent system designs.
//!
//! ## Architecture
//! - `prompt.rs` - Renders schema, specification, gaps and history into one backend instruction
//! - `engine.rs` - Stateless per-turn orchestration over an `LlmProvider`
//! - `session.rs` - In-memory conversation that merges turn results
//! - `types.rs` - History entries, turn outcomes and the decoded backend reply

pub mod engine;
pub mod prompt;
pub mod session;
pub mod types;

pub use engine::{select_reply, RequirementsEngine, FALLBACK_REPLY};
pub use prompt::{PromptComposer, PromptContext, DEFAULT_HISTORY_WINDOW};
pub use session::RequirementsSession;
pub use types::{BackendReply, ConversationRole, HistoryEntry, TurnOutcome};
