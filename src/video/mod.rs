// Video module - in-app playback for catalog entries
mod player;

pub use player::VideoPlayer;
