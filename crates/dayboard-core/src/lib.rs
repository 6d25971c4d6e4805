//! Core types: events, colors, day windows, collections, tracing

pub mod atomic;
pub mod checklist;
pub mod color;
pub mod error;
pub mod event;
pub mod links;
pub mod time;
pub mod tracing;

pub use atomic::write_atomic;
pub use checklist::{ChecklistItem, CollectionKind, Record, sort_newest_first};
pub use color::{PALETTE, color_index, color_of};
pub use error::CoreError;
pub use event::{Event, UNTITLED};
pub use links::{QuickLink, normalize_url};
pub use time::TimeWindow;
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
