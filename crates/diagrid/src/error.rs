//! Error types for Diagrid operations.
//!
//! [`DiagridError`] is the only error a caller of the public API can observe:
//! malformed graphs, failed stages and blown time budgets all degrade into a
//! valid layout plus warnings. [`LayoutError`] is the internal taxonomy each
//! pipeline stage reports to the controller.

use thiserror::Error;

use diagrid_core::model::Stage;

/// The main error type for Diagrid operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagridError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failure reported by a single pipeline stage.
///
/// None of these escape the controller; each is turned into a fallback
/// strategy and a [`LayoutWarning`](diagrid_core::model::LayoutWarning).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("Structural error: {0}")]
    Structural(String),

    #[error("Placement error: {0}")]
    Placement(String),

    #[error("{stage} did not converge after {iterations} iterations")]
    Convergence {
        stage: Stage,
        iterations: usize,
        remaining_overlaps: usize,
    },

    #[error("Time budget of {budget_ms} ms exceeded after {elapsed_ms} ms")]
    BudgetExceeded { elapsed_ms: u64, budget_ms: u64 },
}
