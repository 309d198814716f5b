//! In-memory media catalog.
//!
//! A [`Catalog`] is an immutable snapshot of the scanned library built by
//! [`Catalog::load`]. It is cheap to clone (persistent maps of `Arc`s), which is
//! what lets [`store::CatalogStore`] publish edits copy-on-write.

pub mod error;
pub mod load;
pub mod source;
pub mod store;
pub mod tree;

pub use error::{PlaylistError, ScanError, ScanWarning, ScanWarningReason};
pub use load::{FileDescriptor, LoadReport};
pub use source::{DirectoryScanner, MediaSource, Scan};
pub use store::{CatalogStore, ScanStatus};

use crate::media::{
    Album, Artist, Entity, FIRST_ID, Folder, Genre, Media, MediaId, MediaKind, Music, Playlist,
    SortKey,
};
use im::{OrdMap, Vector};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub(crate) musics: OrdMap<MediaId, Arc<Music>>,
    pub(crate) folders: OrdMap<MediaId, Arc<Folder>>,
    pub(crate) artists: OrdMap<MediaId, Arc<Artist>>,
    pub(crate) albums: OrdMap<MediaId, Arc<Album>>,
    pub(crate) genres: OrdMap<MediaId, Arc<Genre>>,
    pub(crate) playlists: OrdMap<String, Arc<Playlist>>,

    pub(crate) music_order: OrdMap<SortKey, MediaId>,
    pub(crate) root_folders: OrdMap<SortKey, MediaId>,
    pub(crate) artist_order: OrdMap<SortKey, MediaId>,
    pub(crate) album_order: OrdMap<SortKey, MediaId>,
    pub(crate) genre_order: OrdMap<SortKey, MediaId>,
    pub(crate) paths: OrdMap<PathBuf, MediaId>,

    pub(crate) next_playlist_id: u64,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            musics: OrdMap::new(),
            folders: OrdMap::new(),
            artists: OrdMap::new(),
            albums: OrdMap::new(),
            genres: OrdMap::new(),
            playlists: OrdMap::new(),
            music_order: OrdMap::new(),
            root_folders: OrdMap::new(),
            artist_order: OrdMap::new(),
            album_order: OrdMap::new(),
            genre_order: OrdMap::new(),
            paths: OrdMap::new(),
            next_playlist_id: FIRST_ID,
        }
    }
}

impl Catalog {
    pub fn get(&self, kind: MediaKind, id: MediaId) -> Option<Media> {
        match kind {
            MediaKind::Music => self.music(id).map(Media::Music),
            MediaKind::Folder => self.folder(id).map(Media::Folder),
            MediaKind::Artist => self.artist(id).map(Media::Artist),
            MediaKind::Album => self.album(id).map(Media::Album),
            MediaKind::Genre => self.genre(id).map(Media::Genre),
            MediaKind::Playlist => self.playlist_by_id(id).map(Media::Playlist),
        }
    }

    pub fn music(&self, id: MediaId) -> Option<Arc<Music>> {
        self.musics.get(&id).cloned()
    }

    pub fn folder(&self, id: MediaId) -> Option<Arc<Folder>> {
        self.folders.get(&id).cloned()
    }

    pub fn artist(&self, id: MediaId) -> Option<Arc<Artist>> {
        self.artists.get(&id).cloned()
    }

    pub fn album(&self, id: MediaId) -> Option<Arc<Album>> {
        self.albums.get(&id).cloned()
    }

    pub fn genre(&self, id: MediaId) -> Option<Arc<Genre>> {
        self.genres.get(&id).cloned()
    }

    pub fn playlist(&self, name: &str) -> Option<Arc<Playlist>> {
        self.playlists.get(name).cloned()
    }

    pub fn playlist_by_id(&self, id: MediaId) -> Option<Arc<Playlist>> {
        self.playlists.values().find(|p| p.id == id).cloned()
    }

    pub fn music_by_path(&self, path: &Path) -> Option<Arc<Music>> {
        self.paths.get(path).and_then(|id| self.music(*id))
    }

    /// Every track, title sorted.
    pub fn musics(&self) -> Vec<Arc<Music>> {
        self.resolve_musics(self.music_order.values())
    }

    /// Every folder of the tree, in id order.
    pub fn folders(&self) -> Vec<Arc<Folder>> {
        self.folders.values().cloned().collect()
    }

    pub fn artists(&self) -> Vec<Arc<Artist>> {
        Self::resolve(&self.artists, self.artist_order.values())
    }

    pub fn albums(&self) -> Vec<Arc<Album>> {
        Self::resolve(&self.albums, self.album_order.values())
    }

    pub fn genres(&self) -> Vec<Arc<Genre>> {
        Self::resolve(&self.genres, self.genre_order.values())
    }

    /// Playlists ordered by name.
    pub fn playlists(&self) -> Vec<Arc<Playlist>> {
        self.playlists.values().cloned().collect()
    }

    pub fn music_count(&self) -> usize {
        self.musics.len()
    }

    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.musics.is_empty()
    }

    /// The tracks a container holds, in the container's own order.
    ///
    /// Folders yield their whole subtree; a music yields itself.
    pub fn musics_of(&self, media: &Media) -> Vec<Arc<Music>> {
        match media {
            Media::Music(music) => vec![music.clone()],
            Media::Folder(folder) => self.all_music_under(folder),
            Media::Artist(artist) => self.resolve_musics(artist.musics.values()),
            Media::Album(album) => self.resolve_musics(album.musics.values()),
            Media::Genre(genre) => self.resolve_musics(genre.musics.values()),
            Media::Playlist(playlist) => self.resolve_musics(playlist.entries.iter()),
        }
    }

    pub(crate) fn resolve_musics<'a>(
        &self,
        ids: impl Iterator<Item = &'a MediaId>,
    ) -> Vec<Arc<Music>> {
        Self::resolve(&self.musics, ids)
    }

    fn resolve<'a, T>(
        map: &OrdMap<MediaId, Arc<T>>,
        ids: impl Iterator<Item = &'a MediaId>,
    ) -> Vec<Arc<T>> {
        ids.filter_map(|id| map.get(id).cloned()).collect()
    }

    pub(crate) fn create_playlist(&mut self, name: &str) -> Result<Arc<Playlist>, PlaylistError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlaylistError::EmptyName);
        }
        if self.playlists.contains_key(name) {
            return Err(PlaylistError::AlreadyExists(name.to_string()));
        }

        let playlist = Arc::new(Playlist::new(MediaId(self.next_playlist_id), name));
        self.next_playlist_id += 1;
        self.playlists.insert(name.to_string(), playlist.clone());
        Ok(playlist)
    }

    pub(crate) fn delete_playlist(&mut self, name: &str) -> Result<(), PlaylistError> {
        self.playlists
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| PlaylistError::NotFound(name.to_string()))
    }

    /// Appends `music` unless it is already in the playlist. Returns whether it was added.
    pub(crate) fn add_to_playlist(
        &mut self,
        name: &str,
        music: MediaId,
    ) -> Result<bool, PlaylistError> {
        if !self.musics.contains_key(&music) {
            return Err(PlaylistError::UnknownMusic(music.0));
        }
        let playlist = self
            .playlist(name)
            .ok_or_else(|| PlaylistError::NotFound(name.to_string()))?;
        if playlist.contains(music) {
            return Ok(false);
        }

        let mut entries = playlist.entries.clone();
        entries.push_back(music);
        self.playlists
            .insert(name.to_string(), Arc::new(playlist.with_entries(entries)));
        Ok(true)
    }

    pub(crate) fn remove_from_playlist(
        &mut self,
        name: &str,
        music: MediaId,
    ) -> Result<bool, PlaylistError> {
        let playlist = self
            .playlist(name)
            .ok_or_else(|| PlaylistError::NotFound(name.to_string()))?;
        if !playlist.contains(music) {
            return Ok(false);
        }

        let entries: Vector<MediaId> = playlist
            .entries
            .iter()
            .copied()
            .filter(|id| *id != music)
            .collect();
        self.playlists
            .insert(name.to_string(), Arc::new(playlist.with_entries(entries)));
        Ok(true)
    }

    /// Carries user state over from the snapshot this one replaces.
    ///
    /// Ids are reassigned on every scan, so entities are matched by path
    /// (music, folders) or by title (artists, albums, genres). Playlist entries
    /// whose file vanished are dropped.
    pub(crate) fn inherit_from(&mut self, previous: &Catalog) {
        for music in self.musics.values() {
            if let Some(old) = previous.music_by_path(&music.path) {
                music.state.inherit(&old.state);
            }
        }

        let old_folders: HashMap<&Path, &Arc<Folder>> = previous
            .folders
            .values()
            .map(|f| (f.path.as_path(), f))
            .collect();
        for folder in self.folders.values() {
            if let Some(old) = old_folders.get(folder.path.as_path()) {
                folder.state.inherit(&old.state);
            }
        }

        inherit_by_title(self.artists.values(), previous.artists.values());
        inherit_by_title(self.albums.values(), previous.albums.values());
        inherit_by_title(self.genres.values(), previous.genres.values());

        let mut playlists = OrdMap::new();
        for (name, playlist) in previous.playlists.iter() {
            let entries: Vector<MediaId> = playlist
                .entries
                .iter()
                .filter_map(|id| previous.music(*id))
                .filter_map(|old| self.paths.get(&old.path).copied())
                .collect();
            playlists.insert(name.clone(), Arc::new(playlist.with_entries(entries)));
        }
        self.playlists = playlists;
        self.next_playlist_id = previous.next_playlist_id;
    }
}

fn inherit_by_title<'a, T: Entity + 'a>(
    current: impl Iterator<Item = &'a Arc<T>>,
    previous: impl Iterator<Item = &'a Arc<T>>,
) {
    let old: HashMap<&str, &Arc<T>> = previous.map(|e| (e.title(), e)).collect();
    for entity in current {
        if let Some(old) = old.get(entity.title()) {
            entity.state().inherit(old.state());
        }
    }
}
