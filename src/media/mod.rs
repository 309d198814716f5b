pub mod folder;
pub mod group;
pub mod music;

pub use folder::Folder;
pub use group::{Album, Artist, Genre, Playlist, TrackKey};
pub use music::Music;

use arc_swap::ArcSwap;
use std::{
    cmp::Ordering,
    fmt,
    sync::{
        Arc, OnceLock,
        atomic::{AtomicBool, Ordering as AtomicOrdering},
    },
};

/// Ids are assigned per kind by a counter that restarts at this value on every full scan.
pub const FIRST_ID: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MediaId(pub u64);

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Music,
    Folder,
    Artist,
    Album,
    Genre,
    Playlist,
}

/// Display ordering for media: case-folded title, then the raw title, then id.
///
/// Two entities with the same title never compare equal unless they share an id,
/// so sorted maps keyed by `SortKey` keep every entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey {
    folded: String,
    title: String,
    id: MediaId,
}

impl SortKey {
    pub fn new(title: &str, id: MediaId) -> Self {
        Self {
            folded: title.to_lowercase(),
            title: title.to_string(),
            id,
        }
    }

    pub fn id(&self) -> MediaId {
        self.id
    }
}

#[derive(Debug, Default)]
struct StateCell {
    liked: AtomicBool,
    artwork: OnceLock<Arc<[u8]>>,
}

/// The mutable part every media carries: the like flag and lazily attached artwork.
///
/// The same file keeps one cell across rescans: [`MediaState::inherit`] makes the
/// new entity point at its predecessor's cell, so a like made through an `Arc`
/// from an older snapshot is seen by every later one.
#[derive(Debug)]
pub struct MediaState {
    cell: ArcSwap<StateCell>,
}

impl Default for MediaState {
    fn default() -> Self {
        Self {
            cell: ArcSwap::from_pointee(StateCell::default()),
        }
    }
}

impl MediaState {
    pub fn is_liked(&self) -> bool {
        self.cell.load().liked.load(AtomicOrdering::Acquire)
    }

    pub fn set_liked(&self, liked: bool) {
        self.cell.load().liked.store(liked, AtomicOrdering::Release);
    }

    /// Flips the flag and returns the new value.
    pub fn switch_like(&self) -> bool {
        !self.cell.load().liked.fetch_xor(true, AtomicOrdering::AcqRel)
    }

    pub fn artwork(&self) -> Option<Arc<[u8]>> {
        self.cell.load().artwork.get().cloned()
    }

    /// Returns `false` when artwork was already attached.
    pub fn attach_artwork(&self, bytes: Arc<[u8]>) -> bool {
        self.cell.load().artwork.set(bytes).is_ok()
    }

    /// Shares the like flag and artwork of an entity from a previous snapshot.
    pub fn inherit(&self, previous: &MediaState) {
        self.cell.store(previous.cell.load_full());
    }
}

impl PartialEq for MediaState {
    fn eq(&self, other: &Self) -> bool {
        self.is_liked() == other.is_liked() && self.artwork() == other.artwork()
    }
}

/// Capabilities shared by every media entity.
pub trait Entity {
    const KIND: MediaKind;

    fn id(&self) -> MediaId;
    fn title(&self) -> &str;
    fn state(&self) -> &MediaState;

    fn sort_key(&self) -> SortKey {
        SortKey::new(self.title(), self.id())
    }

    fn is_liked(&self) -> bool {
        self.state().is_liked()
    }

    fn switch_like(&self) -> bool {
        self.state().switch_like()
    }

    fn artwork(&self) -> Option<Arc<[u8]>> {
        self.state().artwork()
    }

    fn attach_artwork(&self, bytes: Arc<[u8]>) -> bool {
        self.state().attach_artwork(bytes)
    }
}

macro_rules! impl_entity {
    ($($ty:ident => $kind:ident),* $(,)?) => {
        $(
            impl Entity for $ty {
                const KIND: MediaKind = MediaKind::$kind;

                fn id(&self) -> MediaId {
                    self.id
                }

                fn title(&self) -> &str {
                    &self.title
                }

                fn state(&self) -> &MediaState {
                    &self.state
                }
            }
        )*
    };
}

impl_entity!(
    Music => Music,
    Folder => Folder,
    Artist => Artist,
    Album => Album,
    Genre => Genre,
    Playlist => Playlist,
);

/// Anything the UI can list or play.
#[derive(Debug, Clone, PartialEq)]
pub enum Media {
    Music(Arc<Music>),
    Folder(Arc<Folder>),
    Artist(Arc<Artist>),
    Album(Arc<Album>),
    Genre(Arc<Genre>),
    Playlist(Arc<Playlist>),
}

impl Media {
    fn entity(&self) -> (&MediaState, MediaId, &str) {
        match self {
            Media::Music(m) => (m.state(), m.id(), m.title()),
            Media::Folder(f) => (f.state(), f.id(), f.title()),
            Media::Artist(a) => (a.state(), a.id(), a.title()),
            Media::Album(a) => (a.state(), a.id(), a.title()),
            Media::Genre(g) => (g.state(), g.id(), g.title()),
            Media::Playlist(p) => (p.state(), p.id(), p.title()),
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            Media::Music(_) => MediaKind::Music,
            Media::Folder(_) => MediaKind::Folder,
            Media::Artist(_) => MediaKind::Artist,
            Media::Album(_) => MediaKind::Album,
            Media::Genre(_) => MediaKind::Genre,
            Media::Playlist(_) => MediaKind::Playlist,
        }
    }

    pub fn id(&self) -> MediaId {
        self.entity().1
    }

    pub fn title(&self) -> &str {
        self.entity().2
    }

    pub fn sort_key(&self) -> SortKey {
        SortKey::new(self.title(), self.id())
    }

    pub fn is_liked(&self) -> bool {
        self.entity().0.is_liked()
    }

    pub fn switch_like(&self) -> bool {
        self.entity().0.switch_like()
    }

    pub fn artwork(&self) -> Option<Arc<[u8]>> {
        self.entity().0.artwork()
    }

    pub fn as_music(&self) -> Option<&Arc<Music>> {
        match self {
            Media::Music(music) => Some(music),
            _ => None,
        }
    }

    /// Title order with id as tie breaker.
    pub fn cmp_title(&self, other: &Media) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

macro_rules! impl_into_media {
    ($($ty:ident),*) => {
        $(
            impl From<Arc<$ty>> for Media {
                fn from(media: Arc<$ty>) -> Self {
                    Media::$ty(media)
                }
            }
        )*
    };
}

impl_into_media!(Music, Folder, Artist, Album, Genre, Playlist);
