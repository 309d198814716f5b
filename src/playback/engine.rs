use super::{commands::PlayerCommand, traits::PlaybackEngine};
use crate::media::Music;
use flume::{Receiver, Sender};
use std::{sync::Arc, time::Duration};
use tracing::trace;

/// Forwards transport calls as [`PlayerCommand`]s to whatever drives the real player.
#[derive(Clone)]
pub struct ChannelEngine {
    tx: Sender<PlayerCommand>,
}

impl ChannelEngine {
    pub fn new() -> (Self, Receiver<PlayerCommand>) {
        let (tx, rx) = flume::unbounded();
        (Self { tx }, rx)
    }

    fn send(&self, cmd: PlayerCommand) {
        trace!("Player command: {cmd:?}");
        let _ = self.tx.send(cmd);
    }
}

impl PlaybackEngine for ChannelEngine {
    fn set_queue(&self, queue: &[Arc<Music>]) {
        self.send(PlayerCommand::SetQueue(queue.to_vec()));
    }

    fn play(&self, music: &Arc<Music>) {
        self.send(PlayerCommand::Play(music.clone()));
    }

    fn pause(&self) {
        self.send(PlayerCommand::Pause);
    }

    fn resume(&self) {
        self.send(PlayerCommand::Resume);
    }

    fn seek(&self, position: Duration) {
        self.send(PlayerCommand::Seek(position));
    }
}
