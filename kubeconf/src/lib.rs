pub mod clean;
pub mod direct;
pub mod error;
pub mod merge;
pub mod paths;
pub mod store;

pub use clean::*;
pub use error::{ConfigError, Result, SchemaViolation};
pub use merge::{merge, merge_strict, ContextOverview};
pub use store::{backup, load, load_all, save};
