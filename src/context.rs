use crate::{
    browse::MediaBrowser,
    catalog::{CatalogStore, DirectoryScanner},
    config::Config,
    event::PlaybackEvent,
    navigation::{Destination, Navigator},
    playback::{PlaybackController, PlaybackEngine},
};
use flume::Receiver;
use std::sync::Arc;
use tracing::info;

/// Everything the application shares, built once at startup and passed down.
pub struct AppContext {
    pub config: Config,
    pub catalog: Arc<CatalogStore>,
    pub playback: Arc<PlaybackController>,
    pub navigator: Navigator,
    pub browser: MediaBrowser,
    pub playback_events: Receiver<PlaybackEvent>,
}

impl AppContext {
    pub fn new(config: Config, engine: Arc<dyn PlaybackEngine>) -> Self {
        let (event_tx, playback_events) = flume::unbounded();
        let catalog = Arc::new(CatalogStore::new());
        let playback = Arc::new(PlaybackController::new(
            engine,
            event_tx,
            config.repeat_mode,
        ));

        Self {
            navigator: Navigator::new(catalog.clone(), playback.clone(), Destination::Folders),
            browser: MediaBrowser::new(catalog.clone()),
            config,
            catalog,
            playback,
            playback_events,
        }
    }

    /// Starts a background scan of the configured library. Needs a Tokio runtime.
    pub fn start_scan(&self) -> u64 {
        let scanner =
            DirectoryScanner::new(&self.config.library_root, self.config.extensions.clone());
        info!("Scanning {}", self.config.library_root.display());
        self.catalog.rescan(Arc::new(scanner))
    }

    pub fn shutdown(&self) {
        self.catalog.cancel_scan();
        self.playback.stop();
    }
}
