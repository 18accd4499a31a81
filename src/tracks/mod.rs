pub mod parser;

pub use parser::{parse_track_title, ParsedTrack};
