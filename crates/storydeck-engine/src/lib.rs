pub mod io;
pub mod models;
pub mod sync;

// Re-export key types for easier usage
pub use models::deck::{Deck, DeckData, Page, Theme};
pub use sync::{
    Direction, FollowSync, PageSpan, SyncTiming, clamp_index, page_at, scan, scan_array,
};
