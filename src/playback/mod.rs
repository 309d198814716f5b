pub mod commands;
pub mod controller;
pub mod engine;
pub mod enums;
pub mod error;
pub mod queue;
pub mod traits;

pub use commands::PlayerCommand;
pub use controller::{PlaybackController, PlaybackSnapshot};
pub use engine::ChannelEngine;
pub use enums::RepeatMode;
pub use error::{EngineError, PlaybackError};
pub use queue::{QueueManager, Step};
pub use traits::PlaybackEngine;
