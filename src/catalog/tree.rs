use super::Catalog;
use crate::media::{Entity, FIRST_ID, Folder, Media, MediaId, Music, SortKey};
use im::OrdMap;
use std::{
    collections::HashMap,
    path::{Component, Path, PathBuf},
    sync::Arc,
};

/// Builds the folder hierarchy one directory path at a time.
///
/// Folder ids follow first appearance, so feeding the same paths in the same
/// order always produces the same tree.
pub(crate) struct FolderTreeBuilder {
    nodes: Vec<Folder>,
    by_path: HashMap<PathBuf, MediaId>,
}

impl FolderTreeBuilder {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Vec::new(),
            by_path: HashMap::new(),
        }
    }

    fn node_mut(&mut self, id: MediaId) -> Option<&mut Folder> {
        self.nodes.get_mut((id.0 - FIRST_ID) as usize)
    }

    /// Creates every missing folder along `path` and returns the deepest one.
    /// `None` when the path has no named segment.
    pub(crate) fn insert_path(&mut self, path: &Path) -> Option<MediaId> {
        let mut current: Option<MediaId> = None;
        let mut full = PathBuf::from("/");

        for component in path.components() {
            let Component::Normal(segment) = component else {
                continue;
            };
            full.push(segment);

            if let Some(id) = self.by_path.get(&full) {
                current = Some(*id);
                continue;
            }

            let id = MediaId(FIRST_ID + self.nodes.len() as u64);
            let folder = Folder::new(id, segment.to_string_lossy(), full.clone(), current);
            let key = folder.sort_key();
            self.nodes.push(folder);
            self.by_path.insert(full.clone(), id);

            if let Some(parent) = current.and_then(|parent| self.node_mut(parent)) {
                parent.sub_folders.insert(key, id);
            }
            current = Some(id);
        }

        current
    }

    pub(crate) fn attach_music(&mut self, folder: MediaId, key: SortKey, music: MediaId) {
        if let Some(node) = self.node_mut(folder) {
            node.musics.insert(key, music);
        }
    }

    pub(crate) fn finish(self) -> (OrdMap<MediaId, Arc<Folder>>, OrdMap<SortKey, MediaId>) {
        let mut roots = OrdMap::new();
        let folders = self
            .nodes
            .into_iter()
            .map(|folder| {
                if folder.is_root() {
                    roots.insert(folder.sort_key(), folder.id);
                }
                (folder.id, Arc::new(folder))
            })
            .collect();
        (folders, roots)
    }
}

impl Catalog {
    /// Top level folders, title sorted.
    pub fn root_folders(&self) -> Vec<Arc<Folder>> {
        self.root_folders
            .values()
            .filter_map(|id| self.folder(*id))
            .collect()
    }

    /// Direct children of `folder`, title sorted. The returned list is a fresh copy.
    pub fn sub_folders(&self, folder: &Folder) -> Vec<Arc<Folder>> {
        folder
            .sub_folders
            .values()
            .filter_map(|id| self.folder(*id))
            .collect()
    }

    /// Music stored directly in `folder`, title sorted.
    pub fn musics_in(&self, folder: &Folder) -> Vec<Arc<Music>> {
        self.resolve_musics(folder.musics.values())
    }

    /// Every track in the subtree: a folder's own music first, then each child
    /// folder in title order, depth first.
    pub fn all_music_under(&self, folder: &Folder) -> Vec<Arc<Music>> {
        let mut out = Vec::new();
        self.collect_music(folder, &mut out);
        out
    }

    /// [`Catalog::all_music_under`] applied to every root folder in order.
    pub fn all_root_music(&self) -> Vec<Arc<Music>> {
        let mut out = Vec::new();
        for root in self.root_folders() {
            self.collect_music(&root, &mut out);
        }
        out
    }

    fn collect_music(&self, folder: &Folder, out: &mut Vec<Arc<Music>>) {
        out.extend(self.musics_in(folder));
        for child in self.sub_folders(folder) {
            self.collect_music(&child, out);
        }
    }

    /// What a folder screen lists: child folders, then the folder's own music.
    pub fn folder_contents(&self, folder: &Folder) -> Vec<Media> {
        self.sub_folders(folder)
            .into_iter()
            .map(Media::Folder)
            .chain(self.musics_in(folder).into_iter().map(Media::Music))
            .collect()
    }

    pub fn parent_of(&self, folder: &Folder) -> Option<Arc<Folder>> {
        folder.parent.and_then(|id| self.folder(id))
    }

    pub fn folder_of(&self, music: &Music) -> Option<Arc<Folder>> {
        self.folder(music.folder)
    }
}
