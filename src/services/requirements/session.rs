//! Requirements Session
//!
//! In-memory owner of one conversation's specification and history. The
//! engine is stateless, so this is where turn results are merged back and
//! the transcript grows. Nothing is persisted.

use std::sync::Arc;

use agent_blueprint_core::{MergeReport, Specification};
use tracing::debug;

use super::engine::RequirementsEngine;
use super::types::{HistoryEntry, TurnOutcome};
use crate::utils::error::AppResult;

pub struct RequirementsSession {
    engine: Arc<RequirementsEngine>,
    spec: Specification,
    history: Vec<HistoryEntry>,
}

impl RequirementsSession {
    /// Start with an empty specification
    pub fn new(engine: Arc<RequirementsEngine>) -> Self {
        let spec = Specification::new(engine.schema().clone());
        Self {
            engine,
            spec,
            history: Vec::new(),
        }
    }

    /// Resume from an earlier specification and transcript
    pub fn resume(
        engine: Arc<RequirementsEngine>,
        spec: Specification,
        history: Vec<HistoryEntry>,
    ) -> Self {
        Self {
            engine,
            spec,
            history,
        }
    }

    /// Run one turn and fold its result into the session.
    ///
    /// On error the session is left untouched.
    pub async fn submit(&mut self, user_message: &str) -> AppResult<TurnOutcome> {
        let outcome = self
            .engine
            .run_turn(user_message, &self.spec, &self.history)
            .await?;

        let report: MergeReport = self.spec.merge(&outcome.updated_fields);
        debug!(
            accepted = ?report.accepted,
            turn = self.history.len() / 2 + 1,
            "Merged turn updates"
        );

        self.history.push(HistoryEntry::user(user_message));
        self.history.push(HistoryEntry::assistant(outcome.reply.clone()));

        Ok(outcome)
    }

    pub fn spec(&self) -> &Specification {
        &self.spec
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn missing_required_fields(&self) -> Vec<String> {
        self.spec.missing_required_fields()
    }

    pub fn is_complete(&self) -> bool {
        self.spec.is_complete()
    }

    /// Hand back the accumulated specification
    pub fn into_spec(self) -> Specification {
        self.spec
    }
}
