use super::{Catalog, FileDescriptor, LoadReport, MediaSource, PlaylistError, ScanWarning};
use crate::{
    event::CatalogEvent,
    media::{MediaId, Playlist},
    util::sync::lock,
};
use arc_swap::ArcSwap;
use flume::{Receiver, Sender};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicU64, Ordering},
};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    Empty,
    Loading,
    Loaded,
}

/// Owner of the published catalog snapshot.
///
/// Readers call [`CatalogStore::snapshot`] and keep the returned `Arc` for as
/// long as they need a consistent view; the catalog content of a published
/// snapshot never changes. Only per-entity user state (likes, artwork) is
/// shared with later snapshots. Writers (scan publish and playlist edits) build
/// a new catalog under `write_lock` and swap it in.
pub struct CatalogStore {
    snapshot: ArcSwap<Catalog>,
    warnings: ArcSwap<Vec<ScanWarning>>,
    loading: AtomicBool,
    loaded: AtomicBool,
    generation: AtomicU64,
    write_lock: Mutex<()>,
    scan_task: Mutex<Option<JoinHandle<()>>>,
    subscribers: Mutex<Vec<Sender<CatalogEvent>>>,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(Catalog::default()),
            warnings: ArcSwap::from_pointee(Vec::new()),
            loading: AtomicBool::new(false),
            loaded: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            write_lock: Mutex::new(()),
            scan_task: Mutex::new(None),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn snapshot(&self) -> Arc<Catalog> {
        self.snapshot.load_full()
    }

    /// Warnings collected by the last published scan.
    pub fn warnings(&self) -> Arc<Vec<ScanWarning>> {
        self.warnings.load_full()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    pub fn status(&self) -> ScanStatus {
        if self.is_loading() {
            ScanStatus::Loading
        } else if self.is_loaded() {
            ScanStatus::Loaded
        } else {
            ScanStatus::Empty
        }
    }

    pub fn subscribe(&self) -> Receiver<CatalogEvent> {
        let (tx, rx) = flume::unbounded();
        lock(&self.subscribers).push(tx);
        rx
    }

    fn notify(&self, event: CatalogEvent) {
        lock(&self.subscribers).retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Supersedes whatever scan is in flight and returns the new generation.
    fn begin(&self) -> u64 {
        let generation = {
            let _guard = lock(&self.write_lock);
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(task) = lock(&self.scan_task).take() {
                task.abort();
            }
            self.loading.store(true, Ordering::Release);
            generation
        };
        self.notify(CatalogEvent::ScanStarted { generation });
        generation
    }

    /// Builds and publishes a catalog from already enumerated files.
    pub fn load<I>(&self, files: I) -> Arc<Vec<ScanWarning>>
    where
        I: IntoIterator<Item = FileDescriptor>,
    {
        let generation = self.begin();
        self.publish(generation, Catalog::load(files), Vec::new());
        self.warnings()
    }

    /// Scans `source` in the background and publishes the result.
    ///
    /// A rescan requested while another is running cancels the older one; only
    /// the newest generation is ever published. Must be called inside a Tokio runtime.
    pub fn rescan(self: &Arc<Self>, source: Arc<dyn MediaSource>) -> u64 {
        let generation = self.begin();
        let store = Arc::clone(self);

        let task = tokio::spawn(async move {
            let scan = match source.scan().await {
                Ok(scan) => scan,
                Err(e) => {
                    store.fail(generation, e.to_string());
                    return;
                }
            };

            let files = scan.files;
            let report = match tokio::task::spawn_blocking(move || Catalog::load(files)).await {
                Ok(report) => report,
                Err(e) => {
                    store.fail(generation, e.to_string());
                    return;
                }
            };

            store.publish(generation, report, scan.warnings);
        });

        let mut slot = lock(&self.scan_task);
        if self.generation.load(Ordering::SeqCst) == generation {
            *slot = Some(task);
        } else {
            task.abort();
        }
        generation
    }

    /// Stops any in-flight scan without publishing it.
    pub fn cancel_scan(&self) {
        let _guard = lock(&self.write_lock);
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = lock(&self.scan_task).take() {
            task.abort();
        }
        self.loading.store(false, Ordering::Release);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn publish(
        &self,
        generation: u64,
        report: LoadReport,
        source_warnings: Vec<ScanWarning>,
    ) -> bool {
        let _guard = lock(&self.write_lock);
        if !self.is_current(generation) {
            debug!("Discarding stale scan generation {generation}");
            return false;
        }

        let LoadReport {
            mut catalog,
            warnings,
        } = report;
        catalog.inherit_from(&self.snapshot.load());

        let mut all_warnings = source_warnings;
        all_warnings.extend(warnings);
        let musics = catalog.music_count();
        let warning_count = all_warnings.len();

        self.snapshot.store(Arc::new(catalog));
        self.warnings.store(Arc::new(all_warnings));
        self.loaded.store(true, Ordering::Release);
        self.loading.store(false, Ordering::Release);

        info!(
            "Catalog generation {generation} published: {musics} musics, {warning_count} skipped"
        );
        self.notify(CatalogEvent::Loaded {
            generation,
            musics,
            warnings: warning_count,
        });
        true
    }

    fn fail(&self, generation: u64, reason: String) {
        let _guard = lock(&self.write_lock);
        if !self.is_current(generation) {
            return;
        }
        error!("Scan generation {generation} failed: {reason}");
        self.loading.store(false, Ordering::Release);
        self.notify(CatalogEvent::ScanFailed { generation, reason });
    }

    fn edit<T>(
        &self,
        change: impl FnOnce(&mut Catalog) -> Result<T, PlaylistError>,
    ) -> Result<T, PlaylistError> {
        let out = {
            let _guard = lock(&self.write_lock);
            let mut next = Catalog::clone(&self.snapshot.load());
            let out = change(&mut next)?;
            self.snapshot.store(Arc::new(next));
            out
        };
        self.notify(CatalogEvent::PlaylistsChanged);
        Ok(out)
    }

    pub fn create_playlist(&self, name: &str) -> Result<Arc<Playlist>, PlaylistError> {
        self.edit(|catalog| catalog.create_playlist(name))
    }

    pub fn delete_playlist(&self, name: &str) -> Result<(), PlaylistError> {
        self.edit(|catalog| catalog.delete_playlist(name))
    }

    pub fn add_to_playlist(&self, name: &str, music: MediaId) -> Result<bool, PlaylistError> {
        self.edit(|catalog| catalog.add_to_playlist(name, music))
    }

    pub fn remove_from_playlist(&self, name: &str, music: MediaId) -> Result<bool, PlaylistError> {
        self.edit(|catalog| catalog.remove_from_playlist(name, music))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Scan, ScanError};
    use async_trait::async_trait;
    use std::{path::Path, time::Duration};

    fn fruits() -> Vec<FileDescriptor> {
        vec![
            FileDescriptor::new("/A/song1.mp3").with_title("Banana"),
            FileDescriptor::new("/A/song2.mp3").with_title("Apple"),
            FileDescriptor::new("/B/song3.mp3").with_title("Cherry"),
        ]
    }

    /// A source that never finishes until its gate is opened.
    struct GatedSource {
        gate: Arc<tokio::sync::Notify>,
        files: Vec<FileDescriptor>,
    }

    #[async_trait]
    impl MediaSource for GatedSource {
        async fn scan(&self) -> Result<Scan, ScanError> {
            self.gate.notified().await;
            Ok(Scan {
                files: self.files.clone(),
                warnings: Vec::new(),
            })
        }
    }

    struct FailingSource;

    #[async_trait]
    impl MediaSource for FailingSource {
        async fn scan(&self) -> Result<Scan, ScanError> {
            Err(ScanError::Task("disk gone".into()))
        }
    }

    async fn next_loaded(rx: &Receiver<CatalogEvent>) -> CatalogEvent {
        loop {
            let event = tokio::time::timeout(Duration::from_secs(5), rx.recv_async())
                .await
                .expect("timed out waiting for catalog event")
                .expect("store dropped");
            if !matches!(event, CatalogEvent::ScanStarted { .. }) {
                return event;
            }
        }
    }

    #[test]
    fn starts_empty_and_unloaded() {
        let store = CatalogStore::new();
        assert_eq!(store.status(), ScanStatus::Empty);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn load_publishes_and_notifies() {
        let store = CatalogStore::new();
        let rx = store.subscribe();
        store.load(fruits());

        assert_eq!(store.status(), ScanStatus::Loaded);
        assert_eq!(store.snapshot().music_count(), 3);
        let events: Vec<CatalogEvent> = rx.drain().collect();
        assert_eq!(
            events,
            vec![
                CatalogEvent::ScanStarted { generation: 1 },
                CatalogEvent::Loaded {
                    generation: 1,
                    musics: 3,
                    warnings: 0
                }
            ]
        );
    }

    #[test]
    fn reload_of_unchanged_files_is_equal_and_old_readers_keep_their_view() {
        let store = CatalogStore::new();
        store.load(fruits());
        let before = store.snapshot();
        before
            .music_by_path(Path::new("/A/song1.mp3"))
            .unwrap()
            .state
            .switch_like();
        store.create_playlist("Mix").unwrap();
        let before = store.snapshot();

        store.load(fruits());
        let after = store.snapshot();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(*before, *after);

        store.load(vec![FileDescriptor::new("/C/new.mp3")]);
        assert_eq!(before.music_count(), 3);
        assert_eq!(store.snapshot().music_count(), 1);
    }

    #[test]
    fn likes_through_old_snapshots_reach_later_ones() {
        let store = CatalogStore::new();
        store.load(fruits());
        let path = Path::new("/B/song3.mp3");
        let old = store.snapshot().music_by_path(path).unwrap();

        store.load(fruits());
        store.load(fruits());
        assert!(old.state.switch_like());
        assert!(store.snapshot().music_by_path(path).unwrap().state.is_liked());
        let other = store.snapshot().music_by_path(Path::new("/A/song1.mp3")).unwrap();
        assert!(!other.state.is_liked());
    }

    #[test]
    fn begin_and_publish_agree_on_loading() {
        let store = CatalogStore::new();
        let stale = store.begin();
        let fresh = store.begin();
        assert!(!store.publish(stale, Catalog::load(fruits()), Vec::new()));
        assert_eq!(store.status(), ScanStatus::Loading);
        assert!(store.publish(fresh, Catalog::load(fruits()), Vec::new()));
        assert_eq!(store.status(), ScanStatus::Loaded);
    }

    #[test]
    fn playlist_edits_publish_new_snapshots() {
        let store = CatalogStore::new();
        store.load(fruits());
        let before = store.snapshot();
        let apple = before.music_by_path(Path::new("/A/song2.mp3")).unwrap();

        store.create_playlist("Fav").unwrap();
        assert!(store.add_to_playlist("Fav", apple.id).unwrap());

        assert!(before.playlist("Fav").is_none());
        assert_eq!(
            store.snapshot().playlist("Fav").unwrap().music_ids(),
            vec![apple.id]
        );
        assert!(store.remove_from_playlist("Fav", apple.id).unwrap());
        store.delete_playlist("Fav").unwrap();
        assert!(store.snapshot().playlists().is_empty());
    }

    #[tokio::test]
    async fn rescan_publishes_in_background() {
        let store = Arc::new(CatalogStore::new());
        let rx = store.subscribe();
        let generation = store.rescan(Arc::new(fruits()));
        assert_eq!(
            next_loaded(&rx).await,
            CatalogEvent::Loaded {
                generation,
                musics: 3,
                warnings: 0
            }
        );
        assert!(store.is_loaded());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn newer_rescan_cancels_stale_one() {
        let store = Arc::new(CatalogStore::new());
        let rx = store.subscribe();

        let gate = Arc::new(tokio::sync::Notify::new());
        let stale = store.rescan(Arc::new(GatedSource {
            gate: gate.clone(),
            files: vec![FileDescriptor::new("/Old/x.mp3")],
        }));
        let fresh = store.rescan(Arc::new(fruits()));
        gate.notify_waiters();

        match next_loaded(&rx).await {
            CatalogEvent::Loaded { generation, .. } => assert_eq!(generation, fresh),
            other => panic!("unexpected event {other:?}"),
        }
        assert_ne!(stale, fresh);
        assert_eq!(store.snapshot().music_count(), 3);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.drain().all(|e| !matches!(e, CatalogEvent::Loaded { .. })));
    }

    #[tokio::test]
    async fn failed_scan_keeps_previous_snapshot() {
        let store = Arc::new(CatalogStore::new());
        store.load(fruits());
        let rx = store.subscribe();

        let generation = store.rescan(Arc::new(FailingSource));
        match next_loaded(&rx).await {
            CatalogEvent::ScanFailed { generation: g, .. } => assert_eq!(g, generation),
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(store.snapshot().music_count(), 3);
        assert_eq!(store.status(), ScanStatus::Loaded);
    }
}
