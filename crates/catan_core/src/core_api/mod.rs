mod engine;
mod error;
mod types;

pub use engine::{Engine, Session, StatsView};
pub use error::{CoreError, CoreErrorCode, ParseError};
pub use types::{EngineConfig, Recency, Summary};
