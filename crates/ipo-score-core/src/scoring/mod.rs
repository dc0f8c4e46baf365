pub mod aggregate;
pub mod engine;
pub mod flags;
pub mod normalize;
pub mod policy;
pub mod record;
pub mod risk;

pub use engine::{ScoreComponents, ScoreSummary};
pub use policy::ScoringPolicy;
