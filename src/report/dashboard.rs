use crate::error::Res;
use crate::model::FilterState;
use crate::report::{filter_and_fetch, ChartHandle, ChartRenderer, ChartSpec, RecordSource, Report, Slot};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, trace};

/// The outcome of applying a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// The report was drawn.
    Rendered(Report),
    /// A newer application started while this one was fetching. Nothing was drawn.
    Superseded,
}

struct Slots<R> {
    renderer: R,
    handles: HashMap<Slot, ChartHandle>,
}

impl<R: ChartRenderer> Slots<R> {
    /// Replaces the chart in every slot, disposing the old one first.
    fn render(&mut self, report: &Report, currency: &str) -> Res<()> {
        for slot in Slot::ALL {
            if let Some(old) = self.handles.get(&slot).copied() {
                trace!("Disposing the {slot} chart {}", old.id());
                self.renderer.dispose(old)?;
                let _ = self.handles.remove(&slot);
            }
            let handle = self
                .renderer
                .create(slot, &ChartSpec::for_slot(slot, report))?;
            let _ = self.handles.insert(slot, handle);
        }
        self.renderer.write_summary(&report.lines(currency))
    }
}

/// Owns the charts on screen and makes sure only the latest filter application draws.
pub struct Dashboard<R> {
    slots: Mutex<Slots<R>>,
    generation: AtomicU64,
    currency: String,
}

impl<R: ChartRenderer> Dashboard<R> {
    pub fn new(renderer: R, currency: impl Into<String>) -> Self {
        Self {
            slots: Mutex::new(Slots {
                renderer,
                handles: HashMap::new(),
            }),
            generation: AtomicU64::new(0),
            currency: currency.into(),
        }
    }

    /// Fetches, filters, aggregates and draws. If another call starts before this one's data
    /// arrives, this one returns `Applied::Superseded` and leaves the charts alone.
    pub(crate) async fn apply(&self, source: &RecordSource, filter: &FilterState) -> Res<Applied> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Applying filter (generation {generation})");
        let fetched = filter_and_fetch(source, filter).await;

        let mut slots = self.slots.lock().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding the results of generation {generation}");
            return Ok(Applied::Superseded);
        }
        let report = Report::build(&fetched?);
        slots.render(&report, &self.currency)?;
        Ok(Applied::Rendered(report))
    }

    pub fn into_renderer(self) -> R {
        self.slots.into_inner().renderer
    }
}
