pub mod error;
pub mod scoring;
pub mod types;

#[cfg(feature = "narrative")]
pub mod narrative;

#[cfg(feature = "batch")]
pub mod batch;

pub use error::IpoScoreError;
pub use scoring::engine::{analyze_offering, compute_score, compute_score_with_policy};
pub use scoring::record::FinancialRecord;
pub use scoring::risk::RiskLevel;
pub use scoring::ScoreSummary;
pub use types::*;

/// Standard result type for all ipo-score operations
pub type IpoScoreResult<T> = Result<T, IpoScoreError>;
