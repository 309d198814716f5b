use super::{
    Catalog, ScanWarning, ScanWarningReason,
    tree::FolderTreeBuilder,
};
use crate::media::{Album, Artist, Entity, FIRST_ID, Genre, MediaId, Music, SortKey, TrackKey};
use im::OrdMap;
use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tracing::{debug, warn};

/// What a scanner knows about one audio file. Every field but `path` is optional;
/// empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDescriptor {
    pub path: PathBuf,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub duration: Option<Duration>,
    pub folder_path: Option<PathBuf>,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
}

impl FileDescriptor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_folder_path(mut self, folder_path: impl Into<PathBuf>) -> Self {
        self.folder_path = Some(folder_path.into());
        self
    }

    pub fn with_track(mut self, disc_number: Option<u32>, track_number: Option<u32>) -> Self {
        self.disc_number = disc_number;
        self.track_number = track_number;
        self
    }

    fn resolved_title(&self) -> Option<String> {
        non_empty(self.title.as_deref()).or_else(|| {
            self.path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| non_empty(Some(stem)))
        })
    }

    fn resolved_folder(&self) -> Option<&Path> {
        match &self.folder_path {
            Some(folder) if !folder.as_os_str().is_empty() => Some(folder.as_path()),
            _ => self.path.parent(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub catalog: Catalog,
    pub warnings: Vec<ScanWarning>,
}

/// A grouping under construction. Frozen into an `Arc` once every file is placed.
struct GroupBuilder<K: Ord + Clone> {
    id: MediaId,
    title: String,
    artist: Option<MediaId>,
    musics: OrdMap<K, MediaId>,
}

struct Groups<K: Ord + Clone> {
    by_name: HashMap<String, usize>,
    builders: Vec<GroupBuilder<K>>,
}

impl<K: Ord + Clone> Default for Groups<K> {
    fn default() -> Self {
        Self {
            by_name: HashMap::new(),
            builders: Vec::new(),
        }
    }
}

impl<K: Ord + Clone> Groups<K> {
    fn id_for(&mut self, key: String, title: &str, artist: Option<MediaId>) -> MediaId {
        if let Some(index) = self.by_name.get(&key) {
            return self.builders[*index].id;
        }
        let id = MediaId(FIRST_ID + self.builders.len() as u64);
        self.by_name.insert(key, self.builders.len());
        self.builders.push(GroupBuilder {
            id,
            title: title.to_string(),
            artist,
            musics: OrdMap::new(),
        });
        id
    }

    fn attach(&mut self, id: MediaId, key: K, music: MediaId) {
        let index = (id.0 - FIRST_ID) as usize;
        if let Some(builder) = self.builders.get_mut(index) {
            builder.musics.insert(key, music);
        }
    }
}

impl Catalog {
    /// Builds a catalog from scanner output.
    ///
    /// Files are processed in input order and ids are handed out from
    /// [`FIRST_ID`] per kind, so the same input always yields the same catalog.
    /// Unusable files are skipped and reported, never fatal.
    pub fn load<I>(files: I) -> LoadReport
    where
        I: IntoIterator<Item = FileDescriptor>,
    {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();
        let mut tree = FolderTreeBuilder::new();
        let mut artists: Groups<SortKey> = Groups::default();
        let mut albums: Groups<TrackKey> = Groups::default();
        let mut genres: Groups<SortKey> = Groups::default();
        let mut musics = OrdMap::new();
        let mut music_order = OrdMap::new();
        let mut paths = OrdMap::new();

        for file in files {
            if file.path.as_os_str().is_empty() {
                warnings.push(ScanWarning::new(&file.path, ScanWarningReason::EmptyPath));
                continue;
            }
            if !seen.insert(file.path.clone()) {
                debug!("Duplicate file collapsed: {}", file.path.display());
                warnings.push(ScanWarning::new(&file.path, ScanWarningReason::DuplicatePath));
                continue;
            }
            let Some(title) = file.resolved_title() else {
                warnings.push(ScanWarning::new(&file.path, ScanWarningReason::MissingTitle));
                continue;
            };
            let Some(folder) = file.resolved_folder().and_then(|f| tree.insert_path(f)) else {
                warnings.push(ScanWarning::new(&file.path, ScanWarningReason::MissingFolder));
                continue;
            };

            let id = MediaId(FIRST_ID + musics.len() as u64);
            let key = SortKey::new(&title, id);

            let artist_name = non_empty(file.artist.as_deref());
            let artist = artist_name
                .as_ref()
                .map(|name| artists.id_for(name.clone(), name, None));
            let album = non_empty(file.album.as_deref()).map(|name| {
                let owner = artist_name.as_deref().unwrap_or_default();
                albums.id_for(format!("{name}\u{0}{owner}"), &name, artist)
            });
            let genre = non_empty(file.genre.as_deref())
                .map(|name| genres.id_for(name.clone(), &name, None));

            if let Some(artist) = artist {
                artists.attach(artist, key.clone(), id);
            }
            if let Some(album) = album {
                let track_key = TrackKey::new(file.disc_number, file.track_number, key.clone());
                albums.attach(album, track_key, id);
            }
            if let Some(genre) = genre {
                genres.attach(genre, key.clone(), id);
            }
            tree.attach_music(folder, key.clone(), id);

            let music = Music::new(id, title, file.path.clone(), folder)
                .with_duration(file.duration.unwrap_or_default())
                .with_position(file.disc_number, file.track_number)
                .with_artist(artist)
                .with_album(album)
                .with_genre(genre);

            music_order.insert(key, id);
            paths.insert(file.path, id);
            musics.insert(id, Arc::new(music));
        }

        for warning in &warnings {
            if warning.reason != ScanWarningReason::DuplicatePath {
                warn!("{warning}");
            }
        }

        let (folders, root_folders) = tree.finish();

        let mut artist_order = OrdMap::new();
        let artists: OrdMap<MediaId, Arc<Artist>> = artists
            .builders
            .into_iter()
            .map(|b| {
                let mut artist = Artist::new(b.id, b.title);
                artist.musics = b.musics;
                artist_order.insert(artist.sort_key(), artist.id);
                (artist.id, Arc::new(artist))
            })
            .collect();

        let mut album_order = OrdMap::new();
        let albums: OrdMap<MediaId, Arc<Album>> = albums
            .builders
            .into_iter()
            .map(|b| {
                let mut album = Album::new(b.id, b.title, b.artist);
                album.musics = b.musics;
                album_order.insert(album.sort_key(), album.id);
                (album.id, Arc::new(album))
            })
            .collect();

        let mut genre_order = OrdMap::new();
        let genres: OrdMap<MediaId, Arc<Genre>> = genres
            .builders
            .into_iter()
            .map(|b| {
                let mut genre = Genre::new(b.id, b.title);
                genre.musics = b.musics;
                genre_order.insert(genre.sort_key(), genre.id);
                (genre.id, Arc::new(genre))
            })
            .collect();

        let catalog = Catalog {
            musics,
            folders,
            artists,
            albums,
            genres,
            music_order,
            root_folders,
            artist_order,
            album_order,
            genre_order,
            paths,
            ..Catalog::default()
        };

        LoadReport { catalog, warnings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_falls_back_to_file_stem() {
        let report = Catalog::load(vec![FileDescriptor::new("/A/intro.flac").with_title("  ")]);
        let music = report.catalog.musics();
        assert_eq!(music[0].title, "intro");
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn unusable_files_are_skipped_with_warnings() {
        let report = Catalog::load(vec![
            FileDescriptor::new(""),
            FileDescriptor::new("loose.mp3"),
            FileDescriptor::new("/A/ok.mp3").with_title("Ok"),
        ]);
        assert_eq!(report.catalog.music_count(), 1);
        let reasons: Vec<_> = report.warnings.iter().map(|w| w.reason.clone()).collect();
        assert_eq!(
            reasons,
            vec![ScanWarningReason::EmptyPath, ScanWarningReason::MissingFolder]
        );
    }

    #[test]
    fn duplicate_paths_collapse_to_first_occurrence() {
        let report = Catalog::load(vec![
            FileDescriptor::new("/A/x.mp3").with_title("First"),
            FileDescriptor::new("/A/x.mp3").with_title("Second"),
        ]);
        assert_eq!(report.catalog.music_count(), 1);
        assert_eq!(report.catalog.musics()[0].title, "First");
        assert_eq!(report.warnings[0].reason, ScanWarningReason::DuplicatePath);
    }

    #[test]
    fn groups_are_built_from_tags() {
        let report = Catalog::load(vec![
            FileDescriptor::new("/A/2.mp3")
                .with_title("Second")
                .with_artist("Band")
                .with_album("Record")
                .with_genre("Rock")
                .with_track(Some(1), Some(2)),
            FileDescriptor::new("/A/1.mp3")
                .with_title("First")
                .with_artist("Band")
                .with_album("Record")
                .with_track(Some(1), Some(1)),
            FileDescriptor::new("/A/3.mp3").with_title("Solo").with_artist(""),
        ]);
        let catalog = report.catalog;

        assert_eq!(catalog.artists().len(), 1);
        assert_eq!(catalog.genres().len(), 1);
        let album = &catalog.albums()[0];
        let titles: Vec<String> = catalog
            .resolve_musics(album.music_ids().iter())
            .iter()
            .map(|m| m.title.clone())
            .collect();
        assert_eq!(titles, vec!["First", "Second"]);

        let solo = catalog.music_by_path(Path::new("/A/3.mp3")).unwrap();
        assert!(solo.artist.is_none());
        assert_eq!(album.artist, catalog.artists().first().map(|a| a.id));
    }

    #[test]
    fn explicit_folder_path_overrides_parent() {
        let report = Catalog::load(vec![
            FileDescriptor::new("/storage/x.mp3")
                .with_title("X")
                .with_folder_path("/Music/Live"),
        ]);
        let roots = report.catalog.root_folders();
        assert_eq!(roots[0].title, "Music");
    }
}
