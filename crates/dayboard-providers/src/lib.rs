//! Calendar sources for dayboard.
//!
//! - [`CalendarSource`] - what the refresher and the client fallback call
//! - [`GoogleCalendarSource`] - today's events from the primary Google calendar
//! - [`normalize`] - mapping of upstream items into [`dayboard_core::Event`]
//! - [`FetchError`] - the classified failure of a fetch
//!
//! ```text
//! bearer token ──► GoogleCalendarSource ──► GoogleCalendarClient ──► events.list
//!                          │                                            │
//!                          ◄──────────── normalize_items() ◄────────────┘
//!                          │
//!                          ▼
//!                     Vec<Event>
//! ```

pub mod error;
pub mod google;
pub mod normalize;
pub mod provider;

pub use error::{FetchError, FetchResult, PermissionReason};
pub use google::{DEFAULT_API_BASE, GoogleCalendarClient, GoogleCalendarSource};
pub use normalize::{normalize_event, normalize_items};
pub use provider::{BoxFuture, CalendarSource};
