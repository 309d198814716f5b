use super::{enums::RepeatMode, error::PlaybackError};
use crate::media::{MediaId, Music};
use rand::{rng, seq::SliceRandom};
use std::sync::Arc;

/// Outcome of moving through the queue.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Play(Arc<Music>),
    /// Reached the end with repeat off.
    Ended,
    /// Nothing is loaded.
    Empty,
}

/// Play order over a canonical track list.
///
/// `tracks` keeps the order the queue was loaded with. Shuffling only permutes
/// `order`, a list of indices into `tracks`, so turning shuffle off can always
/// restore the canonical order. `current` indexes `order` and is `None` exactly
/// when the queue is empty.
#[derive(Debug, Default)]
pub struct QueueManager {
    tracks: Vec<Arc<Music>>,
    order: Vec<usize>,
    current: Option<usize>,

    pub repeat_mode: RepeatMode,
    pub is_shuffled: bool,
}

impl QueueManager {
    pub fn new(repeat_mode: RepeatMode) -> Self {
        Self {
            repeat_mode,
            ..Default::default()
        }
    }

    /// Replaces the queue. Nothing changes when the request is invalid.
    ///
    /// A shuffled queue starts at position 0 with the start track moved there.
    pub fn load(
        &mut self,
        tracks: Vec<Arc<Music>>,
        shuffle: bool,
        start_at: Option<MediaId>,
    ) -> Result<Arc<Music>, PlaybackError> {
        if tracks.is_empty() {
            return Err(PlaybackError::EmptyQueue);
        }
        let start = match start_at {
            Some(id) => tracks
                .iter()
                .position(|t| t.id == id)
                .ok_or(PlaybackError::NotInQueue(id))?,
            None => 0,
        };

        let mut order: Vec<usize> = (0..tracks.len()).collect();
        if shuffle {
            order.shuffle(&mut rng());
            if let Some(at) = order.iter().position(|i| *i == start) {
                order.swap(0, at);
            }
        }

        self.current = Some(if shuffle { 0 } else { start });
        self.order = order;
        self.is_shuffled = shuffle;
        let track = tracks[start].clone();
        self.tracks = tracks;
        Ok(track)
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.order.clear();
        self.current = None;
    }

    /// Flips shuffle and returns the new state.
    ///
    /// Turning it on reshuffles only what comes after the current track.
    /// Turning it off restores the canonical order; the current track stays current.
    pub fn toggle_shuffle(&mut self) -> bool {
        self.is_shuffled = !self.is_shuffled;
        if self.is_shuffled {
            let from = self.current.map_or(0, |c| c + 1);
            self.order[from..].shuffle(&mut rng());
        } else {
            let playing = self.current.map(|c| self.order[c]);
            self.order = (0..self.tracks.len()).collect();
            self.current = playing;
        }
        self.is_shuffled
    }

    pub fn toggle_repeat_mode(&mut self) -> RepeatMode {
        self.repeat_mode = self.repeat_mode.cycle();
        self.repeat_mode
    }

    fn track_at(&self, position: usize) -> Option<Arc<Music>> {
        self.order
            .get(position)
            .and_then(|i| self.tracks.get(*i))
            .cloned()
    }

    fn step_to(&mut self, position: usize) -> Step {
        self.current = Some(position);
        match self.track_at(position) {
            Some(track) => Step::Play(track),
            None => Step::Empty,
        }
    }

    pub fn next(&mut self) -> Step {
        let Some(current) = self.current else {
            return Step::Empty;
        };

        match self.repeat_mode {
            RepeatMode::Single => self.step_to(current),
            _ if current + 1 < self.order.len() => self.step_to(current + 1),
            RepeatMode::All => self.step_to(0),
            RepeatMode::Off => Step::Ended,
        }
    }

    /// Moves back one track. At the start with repeat off the first track restarts.
    pub fn previous(&mut self) -> Step {
        let Some(current) = self.current else {
            return Step::Empty;
        };

        match self.repeat_mode {
            RepeatMode::Single => self.step_to(current),
            _ if current > 0 => self.step_to(current - 1),
            RepeatMode::All => self.step_to(self.order.len() - 1),
            RepeatMode::Off => self.step_to(0),
        }
    }

    /// Makes `position` current. `None` when it is out of range.
    pub fn jump_to(&mut self, position: usize) -> Option<Arc<Music>> {
        let track = self.track_at(position)?;
        self.current = Some(position);
        Some(track)
    }

    /// Inserts `music` right after the current track.
    pub fn play_next(&mut self, music: Arc<Music>) {
        self.tracks.push(music);
        let index = self.tracks.len() - 1;
        match self.current {
            Some(current) => self.order.insert(current + 1, index),
            None => {
                self.order.push(index);
                self.current = Some(0);
            }
        }
    }

    pub fn add_to_queue(&mut self, music: Arc<Music>) {
        self.tracks.push(music);
        self.order.push(self.tracks.len() - 1);
        if self.current.is_none() {
            self.current = Some(0);
        }
    }

    /// Tracks in play order.
    pub fn queue(&self) -> Vec<Arc<Music>> {
        self.order
            .iter()
            .filter_map(|i| self.tracks.get(*i).cloned())
            .collect()
    }

    /// Tracks in the order they were loaded, whatever the shuffle state.
    pub fn canonical(&self) -> &[Arc<Music>] {
        &self.tracks
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<Arc<Music>> {
        self.current.and_then(|c| self.track_at(c))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
