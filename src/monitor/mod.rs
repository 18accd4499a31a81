pub mod commands;
pub mod controller;
pub mod state;

pub use controller::{HistoryView, MonitorController};
pub use state::{NowPlayingSnapshot, SamplerStatus, ViewMode};
