pub mod screening;

pub use screening::{score_batch, BatchStats};
