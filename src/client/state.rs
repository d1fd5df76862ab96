//! Client-side cache and lifecycle status of one resource kind.

use crate::models::Record;

/// Lifecycle status of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// Token identifying a request issued through [`CollectionState::request`].
///
/// A [`reset`](CollectionState::reset) invalidates every outstanding token, so
/// a response for a torn-down scope cannot repopulate the cleared list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

/// Records of one kind for the active scope, in server order, plus the
/// status of the latest completed request.
///
/// Transitions: `request` moves any state to `Pending`; a completion moves
/// to `Succeeded` or `Failed`; `reset` returns to an empty `Idle`. A failure
/// keeps the last good list. Requests may overlap: every completion of the
/// current generation is applied in arrival order, so the last one decides
/// the status, and `is_loading` stays true until none are outstanding.
#[derive(Debug, Clone)]
pub struct CollectionState<R> {
    records: Vec<Record<R>>,
    status: Status,
    error: Option<String>,
    loading: bool,
    in_flight: usize,
    generation: u64,
}

impl<R> Default for CollectionState<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            status: Status::Idle,
            error: None,
            loading: false,
            in_flight: 0,
            generation: 0,
        }
    }
}

impl<R> CollectionState<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record<R>] {
        &self.records
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Start a request: clears the previous error.
    pub fn request(&mut self) -> Generation {
        self.status = Status::Pending;
        self.error = None;
        self.loading = true;
        self.in_flight += 1;
        Generation(self.generation)
    }

    /// Replace the list with a fetched one.
    pub fn listed(&mut self, generation: Generation, records: Vec<Record<R>>) -> bool {
        self.complete(generation, Status::Succeeded, |state| {
            state.records = records;
            state.error = None;
        })
    }

    /// Append a created record.
    pub fn created(&mut self, generation: Generation, record: Record<R>) -> bool {
        self.complete(generation, Status::Succeeded, |state| {
            state.records.push(record);
            state.error = None;
        })
    }

    /// Replace the record with the same id. A record missing from the list is
    /// left for the next fetch to bring in.
    pub fn updated(&mut self, generation: Generation, record: Record<R>) -> bool {
        self.complete(generation, Status::Succeeded, |state| {
            if let Some(slot) = state.records.iter_mut().find(|r| r.id == record.id) {
                *slot = record;
            }
            state.error = None;
        })
    }

    /// Drop the record with the given id.
    pub fn deleted(&mut self, generation: Generation, id: &str) -> bool {
        self.complete(generation, Status::Succeeded, |state| {
            state.records.retain(|r| r.id != id);
            state.error = None;
        })
    }

    /// Record a failure, keeping the current list.
    pub fn failed(&mut self, generation: Generation, message: impl Into<String>) -> bool {
        let message = message.into();
        self.complete(generation, Status::Failed, |state| {
            state.error = Some(message)
        })
    }

    /// Return to an empty idle collection and invalidate outstanding requests.
    pub fn reset(&mut self) {
        self.records.clear();
        self.status = Status::Idle;
        self.error = None;
        self.loading = false;
        self.in_flight = 0;
        self.generation += 1;
    }

    /// Take the error message for display, clearing it.
    pub fn take_error(&mut self) -> Option<String> {
        self.error.take()
    }

    /// Apply a completion if it belongs to an outstanding request of the
    /// current generation. Returns whether it was applied.
    fn complete(
        &mut self,
        generation: Generation,
        status: Status,
        apply: impl FnOnce(&mut Self),
    ) -> bool {
        if generation.0 != self.generation || self.in_flight == 0 {
            return false;
        }
        apply(self);
        self.status = status;
        self.in_flight -= 1;
        self.loading = self.in_flight > 0;
        true
    }
}
