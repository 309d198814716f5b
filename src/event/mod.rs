pub mod events;

pub use events::{CatalogEvent, PlaybackEvent};
