//! Destination paths and the queue building that happens when media is opened.

use crate::{
    catalog::CatalogStore,
    media::{Entity, Media, MediaId, Music},
    playback::{PlaybackController, PlaybackError},
};
use std::{fmt, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Folders,
    Artists,
    Albums,
    Genres,
    Playlists,
    Musics,
    Playback,
}

impl Destination {
    pub const SECTIONS: [Destination; 6] = [
        Destination::Folders,
        Destination::Artists,
        Destination::Albums,
        Destination::Genres,
        Destination::Playlists,
        Destination::Musics,
    ];

    pub fn link(&self) -> &'static str {
        match self {
            Destination::Folders => "folders",
            Destination::Artists => "artists",
            Destination::Albums => "albums",
            Destination::Genres => "genres",
            Destination::Playlists => "playlists",
            Destination::Musics => "musics",
            Destination::Playback => "playback",
        }
    }

    pub fn from_link(link: &str) -> Option<Self> {
        Self::SECTIONS
            .into_iter()
            .chain([Destination::Playback])
            .find(|d| d.link() == link)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Destination::Folders => "Folders",
            Destination::Artists => "Artists",
            Destination::Albums => "Albums",
            Destination::Genres => "Genres",
            Destination::Playlists => "Playlists",
            Destination::Musics => "Musics",
            Destination::Playback => "Now playing",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.link())
    }
}

/// Where opening `media` leads, e.g. `folders/5`. Music, and nothing at all,
/// lead to the playback screen.
pub fn destination_of(media: Option<&Media>) -> String {
    let (section, id) = match media {
        Some(Media::Folder(f)) => (Destination::Folders, f.id),
        Some(Media::Artist(a)) => (Destination::Artists, a.id),
        Some(Media::Album(a)) => (Destination::Albums, a.id),
        Some(Media::Genre(g)) => (Destination::Genres, g.id),
        Some(Media::Playlist(p)) => (Destination::Playlists, p.id),
        Some(Media::Music(_)) | None => return Destination::Playback.link().to_string(),
    };
    format!("{}/{}", section.link(), id)
}

/// Drives queue construction and keeps the stack of visited destinations.
pub struct Navigator {
    catalog: Arc<CatalogStore>,
    playback: Arc<PlaybackController>,
    stack: Vec<String>,
}

impl Navigator {
    pub fn new(
        catalog: Arc<CatalogStore>,
        playback: Arc<PlaybackController>,
        start: Destination,
    ) -> Self {
        Self {
            catalog,
            playback,
            stack: vec![start.link().to_string()],
        }
    }

    pub fn current(&self) -> &str {
        self.stack.last().map(String::as_str).unwrap_or_default()
    }

    fn push(&mut self, destination: String) -> String {
        self.stack.push(destination.clone());
        destination
    }

    /// Goes back one destination. The start destination is never popped.
    pub fn back(&mut self) -> &str {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
        self.current()
    }

    fn start(
        &mut self,
        tracks: Vec<Arc<Music>>,
        shuffle: bool,
        start_at: Option<MediaId>,
    ) -> Result<String, PlaybackError> {
        self.playback.load_queue(tracks, shuffle, start_at)?;
        Ok(self.push(Destination::Playback.link().to_string()))
    }

    /// Opens media from a flat list: music plays within every catalog track,
    /// anything else is navigated into.
    pub fn open_media(&mut self, media: &Media) -> Result<String, PlaybackError> {
        match media {
            Media::Music(music) => {
                let all = self.catalog.snapshot().musics();
                self.start(all, false, Some(music.id))
            }
            other => Ok(self.push(destination_of(Some(other)))),
        }
    }

    /// Opens media from a folder screen: music plays within its folder's subtree.
    pub fn open_media_from_folder(&mut self, media: &Media) -> Result<String, PlaybackError> {
        match media {
            Media::Music(music) => {
                let catalog = self.catalog.snapshot();
                let tracks = match catalog.folder_of(music) {
                    Some(folder) => catalog.all_music_under(&folder),
                    None => vec![music.clone()],
                };
                self.start(tracks, false, Some(music.id))
            }
            other => self.open_media(other),
        }
    }

    /// Plays every track a container holds, from the first one.
    pub fn play_all(&mut self, media: &Media, shuffle: bool) -> Result<String, PlaybackError> {
        let tracks = self.catalog.snapshot().musics_of(media);
        self.start(tracks, shuffle, None)
    }

    pub fn shuffle_all(&mut self) -> Result<String, PlaybackError> {
        let all = self.catalog.snapshot().musics();
        self.start(all, true, None)
    }

    /// The playback destination, or `None` when nothing is loaded.
    pub fn open_current_music(&mut self) -> Option<String> {
        let music = self.playback.current_music()?;
        Some(self.push(destination_of(Some(&Media::Music(music)))))
    }

    /// Tracks of the catalog the user liked, title sorted.
    pub fn liked_musics(&self) -> Vec<Arc<Music>> {
        self.catalog
            .snapshot()
            .musics()
            .into_iter()
            .filter(|m| m.is_liked())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::FileDescriptor,
        playback::{ChannelEngine, RepeatMode},
    };

    fn navigator() -> Navigator {
        let catalog = Arc::new(CatalogStore::new());
        catalog.load(vec![
            FileDescriptor::new("/A/song1.mp3").with_title("Banana"),
            FileDescriptor::new("/A/song2.mp3").with_title("Apple"),
            FileDescriptor::new("/B/song3.mp3").with_title("Cherry"),
        ]);
        let (engine, _commands) = ChannelEngine::new();
        let (event_tx, _events) = flume::unbounded();
        let playback = Arc::new(PlaybackController::new(
            Arc::new(engine),
            event_tx,
            RepeatMode::Off,
        ));
        Navigator::new(catalog, playback, Destination::Folders)
    }

    #[test]
    fn destination_paths() {
        let nav = navigator();
        let catalog = nav.catalog.snapshot();
        let folder = Media::Folder(catalog.root_folders()[1].clone());
        assert_eq!(destination_of(Some(&folder)), "folders/2");
        let music = Media::Music(catalog.musics()[0].clone());
        assert_eq!(destination_of(Some(&music)), "playback");
        assert_eq!(destination_of(None), "playback");
    }

    #[test]
    fn link_round_trip() {
        for destination in Destination::SECTIONS {
            assert_eq!(Destination::from_link(destination.link()), Some(destination));
        }
        assert_eq!(Destination::from_link("nowhere"), None);
    }

    #[test]
    fn opening_music_from_folder_queues_that_folder() {
        let mut nav = navigator();
        let catalog = nav.catalog.snapshot();
        let banana = catalog
            .musics()
            .into_iter()
            .find(|m| m.title == "Banana")
            .unwrap();

        let path = nav.open_media_from_folder(&Media::Music(banana.clone())).unwrap();
        assert_eq!(path, "playback");
        let titles: Vec<String> = nav
            .playback
            .queue()
            .iter()
            .map(|m| m.title.clone())
            .collect();
        assert_eq!(titles, vec!["Apple", "Banana"]);
        assert_eq!(nav.playback.current_music().map(|m| m.id), Some(banana.id));
    }

    #[test]
    fn opening_music_from_list_queues_everything() {
        let mut nav = navigator();
        let cherry = nav.catalog.snapshot().musics()[2].clone();
        nav.open_media(&Media::Music(cherry)).unwrap();
        assert_eq!(nav.playback.queue().len(), 3);
        assert_eq!(nav.playback.current_index(), Some(2));
    }

    #[test]
    fn opening_folder_only_navigates() {
        let mut nav = navigator();
        let folder = nav.catalog.snapshot().root_folders()[0].clone();
        let path = nav.open_media(&Media::Folder(folder)).unwrap();
        assert_eq!(path, "folders/1");
        assert_eq!(nav.current(), "folders/1");
        assert!(nav.playback.queue().is_empty());
        assert_eq!(nav.back(), "folders");
        assert_eq!(nav.back(), "folders");
    }

    #[test]
    fn current_music_is_absent_before_anything_plays() {
        let mut nav = navigator();
        assert_eq!(nav.open_current_music(), None);
        nav.shuffle_all().unwrap();
        assert!(nav.playback.is_shuffle());
        assert_eq!(nav.open_current_music().as_deref(), Some("playback"));
    }

    #[test]
    fn play_all_of_empty_playlist_fails_cleanly() {
        let mut nav = navigator();
        let playlist = nav.catalog.create_playlist("Empty").unwrap();
        assert_eq!(
            nav.play_all(&Media::Playlist(playlist), false),
            Err(PlaybackError::EmptyQueue)
        );
        assert_eq!(nav.current(), "folders");
    }

    #[test]
    fn liking_the_playing_track_after_a_rescan_reaches_the_catalog() {
        let mut nav = navigator();
        let cherry = nav.catalog.snapshot().musics()[2].clone();
        nav.open_media(&Media::Music(cherry.clone())).unwrap();
        nav.catalog.load(vec![
            FileDescriptor::new("/A/song1.mp3").with_title("Banana"),
            FileDescriptor::new("/A/song2.mp3").with_title("Apple"),
            FileDescriptor::new("/B/song3.mp3").with_title("Cherry"),
        ]);

        let playing = nav.playback.current_music().unwrap();
        assert!(nav.playback.switch_like(&Media::Music(playing)));
        let fresh = nav.catalog.snapshot().music_by_path(&cherry.path).unwrap();
        assert!(fresh.is_liked());
        let liked: Vec<MediaId> = nav.liked_musics().iter().map(|m| m.id).collect();
        assert_eq!(liked, vec![fresh.id]);
    }

    #[test]
    fn liked_musics_follow_like_flags() {
        let nav = navigator();
        let apple = nav.catalog.snapshot().musics()[0].clone();
        nav.playback.switch_like(&Media::Music(apple.clone()));
        let liked: Vec<MediaId> = nav.liked_musics().iter().map(|m| m.id).collect();
        assert_eq!(liked, vec![apple.id]);
    }
}
