use super::{
    enums::RepeatMode,
    error::{EngineError, PlaybackError},
    queue::{QueueManager, Step},
    traits::PlaybackEngine,
};
use crate::{
    event::PlaybackEvent,
    media::{Media, MediaId, Music},
    util::sync::lock,
};
use flume::Sender;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tracing::{debug, error, warn};

struct PlayerState {
    queue: QueueManager,
    is_playing: bool,
    liked_filter_active: bool,
}

/// A consistent copy of the controller state, taken under its lock.
#[derive(Debug, Clone)]
pub struct PlaybackSnapshot {
    pub queue: Vec<Arc<Music>>,
    pub current_index: Option<usize>,
    pub is_shuffle: bool,
    pub is_playing: bool,
    pub repeat_mode: RepeatMode,
    pub liked_filter_active: bool,
}

/// Single source of truth for what is queued and playing.
///
/// UI actions and engine callbacks arrive from different threads; every entry
/// point takes the same lock, so no two mutations interleave. This is also the
/// only component that issues transport calls to the engine.
pub struct PlaybackController {
    state: Mutex<PlayerState>,
    engine: Arc<dyn PlaybackEngine>,
    event_tx: Sender<PlaybackEvent>,
}

impl PlaybackController {
    pub fn new(
        engine: Arc<dyn PlaybackEngine>,
        event_tx: Sender<PlaybackEvent>,
        repeat_mode: RepeatMode,
    ) -> Self {
        Self {
            state: Mutex::new(PlayerState {
                queue: QueueManager::new(repeat_mode),
                is_playing: false,
                liked_filter_active: false,
            }),
            engine,
            event_tx,
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        let _ = self.event_tx.send(event);
    }

    fn start(&self, state: &mut PlayerState, track: Arc<Music>) {
        self.engine.play(&track);
        self.set_playing(state, true);
        if let Some(index) = state.queue.current_index() {
            self.emit(PlaybackEvent::TrackStarted(track, index));
        }
    }

    fn set_playing(&self, state: &mut PlayerState, is_playing: bool) {
        if state.is_playing != is_playing {
            state.is_playing = is_playing;
            self.emit(PlaybackEvent::PlaybackStateChanged(is_playing));
        }
    }

    /// Replaces the queue and starts playing from `start_at`, or the first track.
    pub fn load_queue(
        &self,
        tracks: Vec<Arc<Music>>,
        shuffle: bool,
        start_at: Option<MediaId>,
    ) -> Result<Arc<Music>, PlaybackError> {
        let mut state = lock(&self.state);
        let was_shuffled = state.queue.is_shuffled;
        let track = state.queue.load(tracks, shuffle, start_at)?;
        debug!(
            "Loaded queue of {} tracks, shuffle={shuffle}",
            state.queue.len()
        );
        self.engine.set_queue(&state.queue.queue());
        self.start(&mut state, track.clone());
        if was_shuffled != shuffle {
            self.emit(PlaybackEvent::ShuffleChanged(shuffle));
        }
        Ok(track)
    }

    pub fn toggle_shuffle(&self) -> bool {
        let mut state = lock(&self.state);
        let is_shuffle = state.queue.toggle_shuffle();
        if !state.queue.is_empty() {
            self.engine.set_queue(&state.queue.queue());
        }
        self.emit(PlaybackEvent::ShuffleChanged(is_shuffle));
        is_shuffle
    }

    fn apply_step(&self, state: &mut PlayerState, step: Step) -> Option<Arc<Music>> {
        match step {
            Step::Play(track) => {
                self.start(state, track.clone());
                Some(track)
            }
            Step::Ended => {
                self.engine.pause();
                self.set_playing(state, false);
                self.emit(PlaybackEvent::QueueEnded);
                None
            }
            Step::Empty => None,
        }
    }

    /// Skips forward. A no-op on an empty queue.
    pub fn next(&self) -> Option<Arc<Music>> {
        let mut state = lock(&self.state);
        let step = state.queue.next();
        self.apply_step(&mut state, step)
    }

    pub fn previous(&self) -> Option<Arc<Music>> {
        let mut state = lock(&self.state);
        let step = state.queue.previous();
        self.apply_step(&mut state, step)
    }

    /// Plays the track at `index` of the current play order.
    pub fn play_at(&self, index: usize) -> Option<Arc<Music>> {
        let mut state = lock(&self.state);
        let track = state.queue.jump_to(index)?;
        self.start(&mut state, track.clone());
        Some(track)
    }

    /// The engine moved on by itself, e.g. a track finished.
    ///
    /// Only reconciles the current index; the engine is already playing it.
    pub fn on_external_track_advanced(&self, new_index: usize) -> Option<Arc<Music>> {
        let mut state = lock(&self.state);
        match state.queue.jump_to(new_index) {
            Some(track) => {
                self.set_playing(&mut state, true);
                self.emit(PlaybackEvent::TrackStarted(track.clone(), new_index));
                Some(track)
            }
            None => {
                warn!(
                    "Engine reported index {new_index} outside a queue of {}",
                    state.queue.len()
                );
                None
            }
        }
    }

    pub fn on_playback_state_changed(&self, is_playing: bool) {
        let mut state = lock(&self.state);
        self.set_playing(&mut state, is_playing);
    }

    /// The engine failed. Playback is considered paused until the user acts again.
    pub fn on_error(&self, code: i32) -> EngineError {
        let err = EngineError { code };
        let mut state = lock(&self.state);
        error!("{err}");
        self.set_playing(&mut state, false);
        self.emit(PlaybackEvent::EngineFailed(err.clone()));
        err
    }

    /// Toggles the like flag of `media` only. Callers showing a liked-only view
    /// refresh it themselves.
    pub fn switch_like(&self, media: &Media) -> bool {
        let _state = lock(&self.state);
        let liked = media.switch_like();
        self.emit(PlaybackEvent::LikeChanged {
            id: media.id(),
            liked,
        });
        liked
    }

    pub fn set_liked_filter(&self, active: bool) {
        lock(&self.state).liked_filter_active = active;
    }

    pub fn liked_filter_active(&self) -> bool {
        lock(&self.state).liked_filter_active
    }

    /// Pauses or resumes. Returns whether playback is now running.
    pub fn play_pause(&self) -> bool {
        let mut state = lock(&self.state);
        if state.queue.is_empty() {
            return false;
        }
        if state.is_playing {
            self.engine.pause();
            self.set_playing(&mut state, false);
        } else {
            self.engine.resume();
            self.set_playing(&mut state, true);
        }
        state.is_playing
    }

    pub fn seek(&self, position: Duration) {
        let state = lock(&self.state);
        if !state.queue.is_empty() {
            self.engine.seek(position);
        }
    }

    /// Empties the queue and pauses the engine.
    pub fn stop(&self) {
        let mut state = lock(&self.state);
        state.queue.clear();
        self.engine.pause();
        self.set_playing(&mut state, false);
    }

    pub fn play_next(&self, music: Arc<Music>) {
        let mut state = lock(&self.state);
        state.queue.play_next(music);
        self.engine.set_queue(&state.queue.queue());
    }

    pub fn add_to_queue(&self, music: Arc<Music>) {
        let mut state = lock(&self.state);
        state.queue.add_to_queue(music);
        self.engine.set_queue(&state.queue.queue());
    }

    pub fn toggle_repeat_mode(&self) -> RepeatMode {
        lock(&self.state).queue.toggle_repeat_mode()
    }

    pub fn set_repeat_mode(&self, mode: RepeatMode) {
        lock(&self.state).queue.repeat_mode = mode;
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        lock(&self.state).queue.repeat_mode
    }

    pub fn is_shuffle(&self) -> bool {
        lock(&self.state).queue.is_shuffled
    }

    pub fn is_playing(&self) -> bool {
        lock(&self.state).is_playing
    }

    pub fn queue(&self) -> Vec<Arc<Music>> {
        lock(&self.state).queue.queue()
    }

    pub fn current_index(&self) -> Option<usize> {
        lock(&self.state).queue.current_index()
    }

    /// The loaded track, or `None` when nothing is queued.
    pub fn current_music(&self) -> Option<Arc<Music>> {
        lock(&self.state).queue.current_track()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let state = lock(&self.state);
        PlaybackSnapshot {
            queue: state.queue.queue(),
            current_index: state.queue.current_index(),
            is_shuffle: state.queue.is_shuffled,
            is_playing: state.is_playing,
            repeat_mode: state.queue.repeat_mode,
            liked_filter_active: state.liked_filter_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::{ChannelEngine, PlayerCommand};
    use flume::Receiver;
    use std::{path::PathBuf, thread};

    fn tracks(n: u64) -> Vec<Arc<Music>> {
        (1..=n)
            .map(|i| {
                Arc::new(Music::new(
                    MediaId(i),
                    format!("Track {i}"),
                    PathBuf::from(format!("/A/{i}.mp3")),
                    MediaId(1),
                ))
            })
            .collect()
    }

    fn controller(
        repeat_mode: RepeatMode,
    ) -> (
        PlaybackController,
        Receiver<PlayerCommand>,
        Receiver<PlaybackEvent>,
    ) {
        let (engine, commands) = ChannelEngine::new();
        let (event_tx, events) = flume::unbounded();
        (
            PlaybackController::new(Arc::new(engine), event_tx, repeat_mode),
            commands,
            events,
        )
    }

    #[test]
    fn load_queue_sets_queue_then_plays() {
        let (controller, commands, _events) = controller(RepeatMode::Off);
        let started = controller
            .load_queue(tracks(3), false, Some(MediaId(2)))
            .unwrap();
        assert_eq!(started.id, MediaId(2));
        assert!(controller.is_playing());

        let sent: Vec<PlayerCommand> = commands.drain().collect();
        assert!(matches!(&sent[0], PlayerCommand::SetQueue(q) if q.len() == 3));
        assert!(matches!(&sent[1], PlayerCommand::Play(t) if t.id == MediaId(2)));
    }

    #[test]
    fn empty_load_fails_and_keeps_previous_queue() {
        let (controller, commands, _events) = controller(RepeatMode::Off);
        controller.load_queue(tracks(2), false, None).unwrap();
        commands.drain().for_each(drop);

        assert_eq!(
            controller.load_queue(Vec::new(), false, None),
            Err(PlaybackError::EmptyQueue)
        );
        assert_eq!(controller.queue().len(), 2);
        assert!(commands.is_empty());
    }

    #[test]
    fn navigation_on_empty_queue_is_silent() {
        let (controller, commands, events) = controller(RepeatMode::All);
        assert!(controller.next().is_none());
        assert!(controller.previous().is_none());
        assert!(!controller.play_pause());
        assert!(controller.current_music().is_none());
        assert!(commands.is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn end_of_queue_pauses_with_repeat_off() {
        let (controller, commands, events) = controller(RepeatMode::Off);
        controller.load_queue(tracks(1), false, None).unwrap();
        commands.drain().for_each(drop);
        events.drain().for_each(drop);

        assert!(controller.next().is_none());
        assert!(!controller.is_playing());
        assert!(matches!(commands.try_recv(), Ok(PlayerCommand::Pause)));
        let sent: Vec<PlaybackEvent> = events.drain().collect();
        assert!(matches!(sent[0], PlaybackEvent::PlaybackStateChanged(false)));
        assert!(matches!(sent[1], PlaybackEvent::QueueEnded));
    }

    #[test]
    fn external_advance_reconciles_index_without_commands() {
        let (controller, commands, _events) = controller(RepeatMode::Off);
        controller.load_queue(tracks(4), false, None).unwrap();
        commands.drain().for_each(drop);

        let track = controller.on_external_track_advanced(2).unwrap();
        assert_eq!(track.id, MediaId(3));
        assert_eq!(controller.current_index(), Some(2));
        assert!(controller.on_external_track_advanced(10).is_none());
        assert_eq!(controller.current_index(), Some(2));
        assert!(commands.is_empty());
    }

    #[test]
    fn engine_error_pauses_and_is_reported() {
        let (controller, _commands, events) = controller(RepeatMode::Off);
        controller.load_queue(tracks(2), false, None).unwrap();
        events.drain().for_each(drop);

        let err = controller.on_error(-38);
        assert_eq!(err.code, -38);
        assert!(!controller.is_playing());
        assert!(
            events
                .drain()
                .any(|e| matches!(e, PlaybackEvent::EngineFailed(EngineError { code: -38 })))
        );
    }

    #[test]
    fn switch_like_touches_only_that_track() {
        let (controller, _commands, _events) = controller(RepeatMode::Off);
        let queue = tracks(3);
        controller.load_queue(queue.clone(), false, None).unwrap();
        let before: Vec<MediaId> = controller.queue().iter().map(|t| t.id).collect();

        assert!(controller.switch_like(&Media::Music(queue[1].clone())));
        assert!(queue[1].state.is_liked());
        assert!(!queue[0].state.is_liked());
        assert!(!queue[2].state.is_liked());
        let after: Vec<MediaId> = controller.queue().iter().map(|t| t.id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn play_pause_round_trip() {
        let (controller, commands, _events) = controller(RepeatMode::Off);
        controller.load_queue(tracks(2), false, None).unwrap();
        commands.drain().for_each(drop);

        assert!(!controller.play_pause());
        assert!(controller.play_pause());
        let sent: Vec<PlayerCommand> = commands.drain().collect();
        assert!(matches!(sent[0], PlayerCommand::Pause));
        assert!(matches!(sent[1], PlayerCommand::Resume));
    }

    #[test]
    fn concurrent_skips_and_callbacks_keep_index_valid() {
        let (controller, _commands, _events) = controller(RepeatMode::All);
        let controller = Arc::new(controller);
        controller.load_queue(tracks(7), false, None).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let controller = controller.clone();
                thread::spawn(move || {
                    for i in 0..200 {
                        match worker {
                            0 => {
                                controller.next();
                            }
                            1 => {
                                controller.on_external_track_advanced(i % 9);
                            }
                            2 => {
                                controller.toggle_shuffle();
                            }
                            _ => {
                                let snapshot = controller.snapshot();
                                let index = snapshot.current_index.unwrap();
                                assert!(index < snapshot.queue.len());
                            }
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.queue.len(), 7);
        assert!(snapshot.current_index.unwrap() < 7);
    }
}
