use crate::{
    catalog::{PlaylistError, ScanError},
    playback::{EngineError, PlaybackError},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Playlist(#[from] PlaylistError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
