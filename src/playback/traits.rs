use crate::media::Music;
use std::{sync::Arc, time::Duration};

/// Outbound transport calls to the engine that actually decodes and plays audio.
///
/// Calls are fire and forget; the engine confirms through the controller's
/// `on_*` callbacks. Implementations must not call back into the controller
/// from inside these methods, which run while the controller's lock is held.
pub trait PlaybackEngine: Send + Sync {
    fn set_queue(&self, queue: &[Arc<Music>]);
    fn play(&self, music: &Arc<Music>);
    fn pause(&self);
    fn resume(&self);
    fn seek(&self, position: Duration);
}
