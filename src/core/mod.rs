pub mod config;
pub mod error;
pub mod types;

pub use config::{GainConfig, ProgressionConfig, RespecCosts};
pub use error::{ProgressionError, Result};
pub use types::{ActorId, School};
