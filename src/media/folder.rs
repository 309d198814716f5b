use super::{MediaId, MediaState, SortKey};
use im::OrdMap;
use std::path::PathBuf;

/// A directory of the scanned library.
///
/// Children are held by id and resolved through the catalog, which keeps the
/// tree free of reference cycles. Every folder but a root has exactly one parent.
#[derive(Debug, PartialEq)]
pub struct Folder {
    pub id: MediaId,
    pub title: String,
    pub path: PathBuf,
    pub parent: Option<MediaId>,
    pub(crate) sub_folders: OrdMap<SortKey, MediaId>,
    pub(crate) musics: OrdMap<SortKey, MediaId>,
    pub(crate) state: MediaState,
}

impl Folder {
    pub fn new(
        id: MediaId,
        title: impl Into<String>,
        path: PathBuf,
        parent: Option<MediaId>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            path,
            parent,
            sub_folders: OrdMap::new(),
            musics: OrdMap::new(),
            state: MediaState::default(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Direct child folder ids, title sorted.
    pub fn sub_folder_ids(&self) -> Vec<MediaId> {
        self.sub_folders.values().copied().collect()
    }

    /// Ids of the music stored directly in this folder, title sorted.
    pub fn music_ids(&self) -> Vec<MediaId> {
        self.musics.values().copied().collect()
    }

    pub fn has_music(&self) -> bool {
        !self.musics.is_empty()
    }
}
