use crate::{
    media::{MediaId, Music},
    playback::EngineError,
};
use std::sync::Arc;

/// Published by the catalog store to its subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    ScanStarted { generation: u64 },
    Loaded {
        generation: u64,
        musics: usize,
        warnings: usize,
    },
    ScanFailed { generation: u64, reason: String },
    PlaylistsChanged,
}

/// Published by the playback controller.
#[derive(Debug, Clone)]
pub enum PlaybackEvent {
    TrackStarted(Arc<Music>, usize),
    QueueEnded,
    PlaybackStateChanged(bool),
    ShuffleChanged(bool),
    LikeChanged { id: MediaId, liked: bool },
    EngineFailed(EngineError),
}
