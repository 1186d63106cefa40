//! Structured run logging.
//!
//! Every flow (batch, edit, video, story) logs through a [`RunLogger`] so
//! records share `run_id` and `operation` fields.

use tracing::{error, info, warn, Span};
use uuid::Uuid;

/// Run-scoped logger with consistent contextual fields.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    operation: String,
}

impl RunLogger {
    /// Logger for a new run with a fresh id.
    pub fn new(operation: &str) -> Self {
        Self::with_id(&Uuid::new_v4().to_string(), operation)
    }

    pub fn with_id(run_id: &str, operation: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(run_id = %self.run_id, operation = %self.operation, "Run started: {}", message);
    }

    pub fn log_progress(&self, message: &str) {
        info!(run_id = %self.run_id, operation = %self.operation, "Run progress: {}", message);
    }

    pub fn log_warning(&self, message: &str) {
        warn!(run_id = %self.run_id, operation = %self.operation, "Run warning: {}", message);
    }

    pub fn log_error(&self, message: &str) {
        error!(run_id = %self.run_id, operation = %self.operation, "Run error: {}", message);
    }

    pub fn log_completion(&self, message: &str) {
        info!(run_id = %self.run_id, operation = %self.operation, "Run completed: {}", message);
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Span carrying the run fields, for instrumenting a whole flow.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("run", run_id = %self.run_id, operation = %self.operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_logger_ids_are_unique() {
        let a = RunLogger::new("batch");
        let b = RunLogger::new("batch");
        assert_ne!(a.run_id(), b.run_id());
        assert_eq!(a.operation(), "batch");
    }

    #[test]
    fn test_run_logger_with_id() {
        let logger = RunLogger::with_id("run-1", "story");
        assert_eq!(logger.run_id(), "run-1");
        assert_eq!(logger.operation(), "story");
    }
}
