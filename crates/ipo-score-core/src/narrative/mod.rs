pub mod summary;

pub use summary::{build_narrative, headline, Narrative, OfferingProfile};
