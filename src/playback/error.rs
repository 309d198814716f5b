use crate::media::MediaId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("cannot play an empty queue")]
    EmptyQueue,

    #[error("music {0} is not part of the queue")]
    NotInQueue(MediaId),
}

/// A failure reported by the external playback engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("playback engine error {code}")]
pub struct EngineError {
    pub code: i32,
}
