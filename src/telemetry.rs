use std::sync::Arc;

/// Structured, in-process event hook for observability.
///
/// This crate is a library; it never prints. Callers that want visibility into dataset
/// transforms provide an implementation that forwards these events to `tracing`, `log`,
/// metrics, or a custom sink. The listener travels with each [`crate::DatasetConfig`],
/// so two datasets never share observability state unless the caller hands them the
/// same listener.
pub trait TableEventListener: std::fmt::Debug + Send + Sync + 'static {
    fn on_event(&self, event: TableEvent);
}

/// Structured events emitted by the dataset and response builders.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    /// A new column was registered. `rows_backfilled` existing rows received a cell for it.
    ColumnAdded { column: String, rows_backfilled: usize },
    /// A range filter dropped at least one row.
    RowsFiltered { removed: usize, kept: usize },
    Accumulated { rows: usize, columns: usize },
    TableRendered { columns: usize, rows: usize },
    ShapeMismatch { column: String, expected: usize, actual: usize },
}

#[derive(Debug)]
pub struct NoopEventListener;

impl TableEventListener for NoopEventListener {
    #[inline]
    fn on_event(&self, _event: TableEvent) {}
}

pub fn noop_event_listener() -> Arc<dyn TableEventListener> {
    Arc::new(NoopEventListener)
}

/// Listener that keeps every event in memory. Handy in tests and for debugging a
/// single request.
#[derive(Debug, Default)]
pub struct RecordingEventListener {
    events: std::sync::Mutex<Vec<TableEvent>>,
}

impl RecordingEventListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the events seen so far, in arrival order.
    pub fn events(&self) -> Vec<TableEvent> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl TableEventListener for RecordingEventListener {
    fn on_event(&self, event: TableEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event);
        }
    }
}
