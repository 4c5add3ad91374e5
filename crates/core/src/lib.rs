//! Agent Blueprint Core
//!
//! Foundational types for incrementally building a multi-agent system
//! specification. This crate performs no network I/O and has no knowledge of
//! LLM providers or the conversation engine.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `schema` - Declarative field table (`SchemaDescriptor`, `FieldDescriptor`)
//! - `spec_model` - Typed accumulator of field values (`Specification`)
//! - `suggestions` - Ordered heuristic rules (`SuggestionEngine`, `SuggestionRule`)

pub mod error;
pub mod schema;
pub mod spec_model;
pub mod suggestions;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Schema Descriptor ──────────────────────────────────────────────────
pub use schema::{FieldDescriptor, FieldType, NestedType, SchemaDescriptor};

// ── Specification Model ────────────────────────────────────────────────
pub use spec_model::{has_value, MergeReport, SpecInput, Specification};

// ── Suggestion Engine ──────────────────────────────────────────────────
pub use suggestions::{SuggestionEngine, SuggestionRule};
