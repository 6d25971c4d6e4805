//! Relay HTTP request/response types for dayboard.
//!
//! The relay speaks plain JSON over HTTP:
//!
//! | Method | Path | Body | Response |
//! |---|---|---|---|
//! | GET | `/api/calendar/events` | | [`EventsResponse`] |
//! | POST | `/api/calendar/token` | [`TokenRequest`] | [`RelayResponse`] |
//! | POST | `/api/calendar/refresh` | | [`RelayResponse`] |
//! | GET | `/api/calendar/status` | | [`RefreshStatus`] |

mod types;

pub use types::{EventsResponse, RefreshStatus, RelayResponse, TokenRequest};

/// Cached events.
pub const EVENTS_PATH: &str = "/api/calendar/events";

/// Token submission.
pub const TOKEN_PATH: &str = "/api/calendar/token";

/// Forced refresh.
pub const REFRESH_PATH: &str = "/api/calendar/refresh";

/// Refresh bookkeeping.
pub const STATUS_PATH: &str = "/api/calendar/status";

/// Liveness probe.
pub const HEALTH_PATH: &str = "/health";
