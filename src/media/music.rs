use super::{MediaId, MediaState};
use std::{path::PathBuf, time::Duration};

/// A playable track. Immutable once the catalog is published, except for its [`MediaState`].
///
/// Back references to folder, artist, album and genre are ids into the owning catalog.
#[derive(Debug, PartialEq)]
pub struct Music {
    pub id: MediaId,
    pub title: String,
    pub path: PathBuf,
    pub duration: Duration,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
    pub folder: MediaId,
    pub artist: Option<MediaId>,
    pub album: Option<MediaId>,
    pub genre: Option<MediaId>,
    pub(crate) state: MediaState,
}

impl Music {
    pub fn new(id: MediaId, title: impl Into<String>, path: PathBuf, folder: MediaId) -> Self {
        Self {
            id,
            title: title.into(),
            path,
            duration: Duration::ZERO,
            track_number: None,
            disc_number: None,
            folder,
            artist: None,
            album: None,
            genre: None,
            state: MediaState::default(),
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_position(mut self, disc_number: Option<u32>, track_number: Option<u32>) -> Self {
        self.disc_number = disc_number;
        self.track_number = track_number;
        self
    }

    pub fn with_artist(mut self, artist: Option<MediaId>) -> Self {
        self.artist = artist;
        self
    }

    pub fn with_album(mut self, album: Option<MediaId>) -> Self {
        self.album = album;
        self
    }

    pub fn with_genre(mut self, genre: Option<MediaId>) -> Self {
        self.genre = genre;
        self
    }
}
