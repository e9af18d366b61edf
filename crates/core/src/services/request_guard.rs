use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::errors::CoreError;

/// Marks one user action (import, export, save) as outstanding so a second
/// submit is refused until the first resolves.
#[derive(Debug, Default)]
pub struct InFlight {
    busy: AtomicBool,
}

/// Releases its [`InFlight`] slot on drop, including on early return or
/// panic.
#[derive(Debug)]
#[must_use = "the action is only marked in flight while the guard is alive"]
pub struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while another guard is alive.
    pub fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard { flag: &self.busy })
    }

    /// Like [`InFlight::try_begin`], failing with [`CoreError::Busy`].
    pub fn begin(&self, action: &str) -> Result<InFlightGuard<'_>, CoreError> {
        self.try_begin()
            .ok_or_else(|| CoreError::Busy(action.to_string()))
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Ticket handed out by [`SearchSequencer::issue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

/// Discards stale responses when searches for one control overlap.
///
/// Each new query takes a ticket; a response is only used if its ticket is
/// still the newest one when it arrives.
#[derive(Debug, Default)]
pub struct SearchSequencer {
    latest: AtomicU64,
}

impl SearchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> SearchTicket {
        SearchTicket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    #[must_use]
    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// Invalidate every outstanding ticket (e.g. the view went away).
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::AcqRel);
    }

    /// Run `search` under a fresh ticket. `None` if a newer search was
    /// issued before this one finished.
    pub async fn run<F, T>(&self, search: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let ticket = self.issue();
        let result = search.await;
        if self.is_current(ticket) {
            Some(result)
        } else {
            tracing::debug!(ticket = ticket.0, "discarding stale search response");
            None
        }
    }
}
