use super::{MediaId, MediaState, SortKey};
use im::{OrdMap, Vector};

#[derive(Debug, PartialEq)]
pub struct Artist {
    pub id: MediaId,
    pub title: String,
    pub(crate) musics: OrdMap<SortKey, MediaId>,
    pub(crate) state: MediaState,
}

impl Artist {
    pub fn new(id: MediaId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            musics: OrdMap::new(),
            state: MediaState::default(),
        }
    }

    pub fn music_ids(&self) -> Vec<MediaId> {
        self.musics.values().copied().collect()
    }
}

#[derive(Debug, PartialEq)]
pub struct Genre {
    pub id: MediaId,
    pub title: String,
    pub(crate) musics: OrdMap<SortKey, MediaId>,
    pub(crate) state: MediaState,
}

impl Genre {
    pub fn new(id: MediaId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            musics: OrdMap::new(),
            state: MediaState::default(),
        }
    }

    pub fn music_ids(&self) -> Vec<MediaId> {
        self.musics.values().copied().collect()
    }
}

/// Album track order: disc, then track number, then title. Unnumbered tracks sort last.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrackKey {
    disc: u32,
    track: u32,
    title: SortKey,
}

impl TrackKey {
    pub fn new(disc: Option<u32>, track: Option<u32>, title: SortKey) -> Self {
        Self {
            disc: disc.unwrap_or(u32::MAX),
            track: track.unwrap_or(u32::MAX),
            title,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Album {
    pub id: MediaId,
    pub title: String,
    pub artist: Option<MediaId>,
    pub(crate) musics: OrdMap<TrackKey, MediaId>,
    pub(crate) state: MediaState,
}

impl Album {
    pub fn new(id: MediaId, title: impl Into<String>, artist: Option<MediaId>) -> Self {
        Self {
            id,
            title: title.into(),
            artist,
            musics: OrdMap::new(),
            state: MediaState::default(),
        }
    }

    pub fn music_ids(&self) -> Vec<MediaId> {
        self.musics.values().copied().collect()
    }
}

/// A user playlist. Entries keep the order the user gave them.
#[derive(Debug, PartialEq)]
pub struct Playlist {
    pub id: MediaId,
    pub title: String,
    pub(crate) entries: Vector<MediaId>,
    pub(crate) state: MediaState,
}

impl Playlist {
    pub fn new(id: MediaId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            entries: Vector::new(),
            state: MediaState::default(),
        }
    }

    pub fn music_ids(&self) -> Vec<MediaId> {
        self.entries.iter().copied().collect()
    }

    pub fn contains(&self, music: MediaId) -> bool {
        self.entries.contains(&music)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A copy of this playlist holding `entries`, keeping id, title and like state.
    pub(crate) fn with_entries(&self, entries: Vector<MediaId>) -> Self {
        let playlist = Self {
            id: self.id,
            title: self.title.clone(),
            entries,
            state: MediaState::default(),
        };
        playlist.state.inherit(&self.state);
        playlist
    }
}
