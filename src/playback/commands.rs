use crate::media::Music;
use std::{sync::Arc, time::Duration};

#[derive(Debug, Clone)]
pub enum PlayerCommand {
    SetQueue(Vec<Arc<Music>>),
    Play(Arc<Music>),
    Pause,
    Resume,
    Seek(Duration),
}
