#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic analytics system that publishes cleaning-progress reports.

use grid_sweepers_core::{CleaningReport, Event, RobotView};

/// Pure analytics system that folds the tile census and robot move counts
/// into one [`CleaningReport`] per observed tick.
#[derive(Debug, Default)]
pub struct Analytics {
    last_report: Option<CleaningReport>,
}

impl Analytics {
    /// Creates a new analytics system with no published report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last report published by the system, if any.
    #[must_use]
    pub fn last_report(&self) -> Option<&CleaningReport> {
        self.last_report.as_ref()
    }

    /// Consumes the tick's events and snapshots to publish a fresh report.
    ///
    /// Publishes at most once per call, keyed to the newest
    /// [`Event::TimeAdvanced`] in the stream; calls without a tick leave the
    /// previous report in place.
    pub fn handle(
        &mut self,
        events: &[Event],
        tile_census: (u32, u32),
        robots: &RobotView,
        out: &mut Vec<Event>,
    ) {
        let newest_tick = events.iter().rev().find_map(|event| match event {
            Event::TimeAdvanced { tick } => Some(*tick),
            _ => None,
        });
        let Some(tick) = newest_tick else {
            return;
        };

        let (dirty, cleaned) = tile_census;
        let report = CleaningReport {
            tick,
            dirty,
            cleaned,
            robot_moves: robots
                .iter()
                .map(|snapshot| (snapshot.id, snapshot.move_count))
                .collect(),
        };
        self.last_report = Some(report.clone());
        out.push(Event::ReportPublished { report });
    }
}
