use crate::duration::CalendarDuration;
use crate::forest::Forest;
use crate::task::ScheduleRow;
use rayon::prelude::*;
use tracing::{instrument, warn};

pub mod outline;

pub use outline::{Outline, OutlineRow};

/// Receiver of a forest walk, e.g. a writer for an exchange schema.
///
/// Handles are whatever the sink needs to wire a child to its parent
/// (entity ids, row indices). Identifier allocation and persistence belong
/// to the implementation.
pub trait Materializer {
    type Handle;
    type Error;

    /// The umbrella task that every root is nested under.
    fn summary(&mut self) -> Result<Self::Handle, Self::Error>;

    fn task(
        &mut self,
        row: &ScheduleRow,
        duration: Option<&CalendarDuration>,
        parent: &Self::Handle,
    ) -> Result<Self::Handle, Self::Error>;
}

/// Feeds every node to `sink` depth-first, pre-order, with the handle of its
/// parent (the summary handle for roots). Returns the number of tasks written.
///
/// Durations are computed up front in parallel. A node whose `Start` or
/// `Finish` does not parse gets no duration.
#[instrument(level = "debug", skip_all, fields(nodes = forest.len()))]
pub fn materialize<M: Materializer>(forest: &Forest, sink: &mut M) -> Result<usize, M::Error> {
    let nodes: Vec<_> = forest.walk().collect();
    let prepared: Vec<(usize, ScheduleRow, Option<CalendarDuration>)> = nodes
        .par_iter()
        .map(|(level, node)| {
            let row = ScheduleRow::from_record(node.data());
            let duration = row.task_duration().unwrap_or_else(|err| {
                warn!(id = %row.id, error = %err, "skipping duration");
                None
            });
            (*level, row, duration)
        })
        .collect();

    let mut parents = vec![sink.summary()?];
    for (level, row, duration) in &prepared {
        parents.truncate(level + 1);
        let handle = sink.task(row, duration.as_ref(), &parents[*level])?;
        parents.push(handle);
    }
    Ok(prepared.len())
}
