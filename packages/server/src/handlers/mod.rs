pub mod audio;
pub mod recording;
