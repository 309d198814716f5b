//! Id based content listing for voice and head-unit clients.
//!
//! Node ids are `root`, a section link such as `folders`, or a section link
//! followed by a media id (`folders/3`). Music items are `musics/{id}` and are
//! playable rather than browsable.

use crate::{
    catalog::{Catalog, CatalogStore},
    media::{Media, MediaId, MediaKind},
    navigation::Destination,
};
use std::sync::Arc;

pub const ROOT_ID: &str = "root";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub browsable: bool,
}

impl BrowseItem {
    fn page(destination: Destination) -> Self {
        Self {
            id: destination.link().to_string(),
            title: destination.title().to_string(),
            description: format!("All {}", destination.link()),
            browsable: true,
        }
    }

    fn media(media: &Media) -> Self {
        let (section, description) = match media.kind() {
            MediaKind::Music => (Destination::Musics, "Music"),
            MediaKind::Folder => (Destination::Folders, "Folder"),
            MediaKind::Artist => (Destination::Artists, "Artist"),
            MediaKind::Album => (Destination::Albums, "Album"),
            MediaKind::Genre => (Destination::Genres, "Genre"),
            MediaKind::Playlist => (Destination::Playlists, "Playlist"),
        };
        Self {
            id: format!("{}/{}", section.link(), media.id()),
            title: media.title().to_string(),
            description: description.to_string(),
            browsable: media.kind() != MediaKind::Music,
        }
    }
}

fn items<T, I>(media: I) -> Vec<BrowseItem>
where
    I: IntoIterator<Item = T>,
    T: Into<Media>,
{
    media
        .into_iter()
        .map(|m| BrowseItem::media(&m.into()))
        .collect()
}

pub struct MediaBrowser {
    catalog: Arc<CatalogStore>,
}

impl MediaBrowser {
    pub fn new(catalog: Arc<CatalogStore>) -> Self {
        Self { catalog }
    }

    pub fn root(&self) -> &'static str {
        ROOT_ID
    }

    /// Children of `parent_id`, or `None` when the id names nothing.
    pub fn children(&self, parent_id: &str) -> Option<Vec<BrowseItem>> {
        let catalog = self.catalog.snapshot();
        if parent_id == ROOT_ID {
            let pages = Destination::SECTIONS.into_iter().map(BrowseItem::page);
            return Some(pages.collect());
        }

        match parent_id.split_once('/') {
            None => section(&catalog, Destination::from_link(parent_id)?),
            Some((link, id)) => {
                let id = MediaId(id.parse().ok()?);
                node(&catalog, Destination::from_link(link)?, id)
            }
        }
    }

    /// Resolves a playable `musics/{id}` item back to its media.
    pub fn media(&self, item_id: &str) -> Option<Media> {
        let (link, id) = item_id.split_once('/')?;
        let id = MediaId(id.parse().ok()?);
        let kind = match Destination::from_link(link)? {
            Destination::Musics => MediaKind::Music,
            Destination::Folders => MediaKind::Folder,
            Destination::Artists => MediaKind::Artist,
            Destination::Albums => MediaKind::Album,
            Destination::Genres => MediaKind::Genre,
            Destination::Playlists => MediaKind::Playlist,
            Destination::Playback => return None,
        };
        self.catalog.snapshot().get(kind, id)
    }
}

fn section(catalog: &Catalog, destination: Destination) -> Option<Vec<BrowseItem>> {
    let list = match destination {
        Destination::Folders => items(catalog.root_folders()),
        Destination::Artists => items(catalog.artists()),
        Destination::Albums => items(catalog.albums()),
        Destination::Genres => items(catalog.genres()),
        Destination::Playlists => items(catalog.playlists()),
        Destination::Musics => items(catalog.musics()),
        Destination::Playback => return None,
    };
    Some(list)
}

fn node(catalog: &Catalog, destination: Destination, id: MediaId) -> Option<Vec<BrowseItem>> {
    let media = match destination {
        Destination::Folders => {
            let folder = catalog.folder(id)?;
            return Some(
                catalog
                    .folder_contents(&folder)
                    .iter()
                    .map(BrowseItem::media)
                    .collect(),
            );
        }
        Destination::Artists => Media::Artist(catalog.artist(id)?),
        Destination::Albums => Media::Album(catalog.album(id)?),
        Destination::Genres => Media::Genre(catalog.genre(id)?),
        Destination::Playlists => Media::Playlist(catalog.playlist_by_id(id)?),
        Destination::Musics | Destination::Playback => return None,
    };
    Some(items(catalog.musics_of(&media)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FileDescriptor;

    fn browser() -> MediaBrowser {
        let store = Arc::new(CatalogStore::new());
        store.load(vec![
            FileDescriptor::new("/A/song1.mp3")
                .with_title("Banana")
                .with_artist("Fruits")
                .with_genre("Pop"),
            FileDescriptor::new("/A/song2.mp3").with_title("Apple"),
            FileDescriptor::new("/A/Sub/song4.mp3").with_title("Date"),
            FileDescriptor::new("/B/song3.mp3")
                .with_title("Cherry")
                .with_artist("Fruits")
                .with_album("Basket"),
        ]);
        MediaBrowser::new(store)
    }

    fn ids(items: &[BrowseItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn root_lists_sections() {
        let browser = browser();
        let root = browser.children(browser.root()).unwrap();
        assert_eq!(
            ids(&root),
            vec!["folders", "artists", "albums", "genres", "playlists", "musics"]
        );
        assert!(root.iter().all(|i| i.browsable));
    }

    #[test]
    fn folders_then_folder_contents() {
        let browser = browser();
        let roots = browser.children("folders").unwrap();
        let titles: Vec<&str> = roots.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);

        let a = browser.children(&roots[0].id).unwrap();
        let titles: Vec<&str> = a.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Sub", "Apple", "Banana"]);
        assert!(a[0].browsable);
        assert!(a[1].id.starts_with("musics/"));
        assert!(!a[1].browsable);
    }

    #[test]
    fn groups_list_their_music() {
        let browser = browser();
        let artists = browser.children("artists").unwrap();
        assert_eq!(artists.len(), 1);
        let music = browser.children(&artists[0].id).unwrap();
        let titles: Vec<&str> = music.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Banana", "Cherry"]);

        let genres = browser.children("genres").unwrap();
        assert_eq!(genres[0].title, "Pop");
        assert_eq!(browser.children("musics").unwrap().len(), 4);
    }

    #[test]
    fn unknown_ids_yield_none() {
        let browser = browser();
        assert_eq!(browser.children("folders/999"), None);
        assert_eq!(browser.children("folders/abc"), None);
        assert_eq!(browser.children("nowhere"), None);
        assert_eq!(browser.children("playback"), None);
        assert_eq!(browser.children("musics/1"), None);
    }

    #[test]
    fn music_items_resolve_back_to_media() {
        let browser = browser();
        let first = &browser.children("musics").unwrap()[0];
        let media = browser.media(&first.id).unwrap();
        assert_eq!(media.title(), "Apple");
        assert!(browser.media("musics/999").is_none());
    }
}
