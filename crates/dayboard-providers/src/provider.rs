//! The [`CalendarSource`] trait.

use std::future::Future;
use std::pin::Pin;

use dayboard_core::Event;

use crate::error::FetchResult;

/// A boxed future for trait methods used behind `dyn`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Something that turns a bearer token into today's events.
///
/// The refresher holds one behind an `Arc<dyn CalendarSource>`; tests swap in
/// scripted sources.
///
/// ```ignore
/// impl CalendarSource for Fixed {
///     fn name(&self) -> &str { "fixed" }
///
///     fn fetch<'a>(&'a self, _token: &'a str) -> BoxFuture<'a, FetchResult<Vec<Event>>> {
///         Box::pin(async move { Ok(self.events.clone()) })
///     }
/// }
/// ```
pub trait CalendarSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Fetches the events of the current day using `token`.
    ///
    /// Implementations make exactly one upstream call and never retry.
    fn fetch<'a>(&'a self, token: &'a str) -> BoxFuture<'a, FetchResult<Vec<Event>>>;
}
