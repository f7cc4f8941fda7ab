use chrono::{DateTime, Utc};

use super::format::format_duration_ms;
use super::types::Job;
use crate::views::{Timeline, TimelineBar, TimelineTick};

/// Milliseconds of execution represented by one pixel before clamping.
const MS_PER_PIXEL: f64 = 100.0;
const MIN_CHART_WIDTH: f64 = 600.0;
const MAX_CHART_WIDTH: f64 = 1600.0;

/// Candidate grid intervals, ascending. The smallest one that keeps the
/// tick count at or under [`MAX_TICK_COUNT`] wins.
const TICK_CANDIDATES_MS: [i64; 7] = [5_000, 10_000, 30_000, 60_000, 120_000, 300_000, 600_000];
const MAX_TICK_COUNT: i64 = 8;

/// Derives Gantt-style bar geometry for a workflow's jobs.
///
/// Only jobs with a start timestamp participate; the rest are simply not
/// rendered. `now` stands in for the stop time of still-running jobs and
/// is passed in so the derivation stays a pure function. A zero total
/// duration (all jobs on one instant) yields full-width bars at offset 0
/// and no grid lines rather than a division error.
pub fn derive_timeline(jobs: &[Job], now: DateTime<Utc>) -> Timeline {
    let mut included: Vec<&Job> = jobs.iter().filter(|job| job.started_at.is_some()).collect();

    if included.is_empty() {
        return Timeline {
            started_at: None,
            total_duration_ms: 0,
            chart_width_px: MIN_CHART_WIDTH,
            bars: Vec::new(),
            ticks: Vec::new(),
        };
    }

    included.sort_by(|a, b| {
        a.started_at
            .cmp(&b.started_at)
            .then_with(|| a.name.cmp(&b.name))
    });

    let global_start = included
        .iter()
        .filter_map(|job| job.started_at)
        .min()
        .expect("included jobs all have a start");
    let global_end = included
        .iter()
        .map(|job| job.stopped_at.unwrap_or(now))
        .max()
        .expect("included is non-empty");

    let total_ms = (global_end - global_start).num_milliseconds().max(0);

    #[allow(clippy::cast_precision_loss)]
    let chart_width = (total_ms as f64 / MS_PER_PIXEL).clamp(MIN_CHART_WIDTH, MAX_CHART_WIDTH);

    #[allow(clippy::cast_precision_loss)]
    let bars = included
        .iter()
        .map(|job| {
            let started = job.started_at.expect("included jobs all have a start");
            let offset_ms = (started - global_start).num_milliseconds();
            let duration_ms = (job.stopped_at.unwrap_or(now) - started).num_milliseconds();

            let (start_offset_px, width_px) = if total_ms == 0 {
                (0.0, chart_width)
            } else {
                (
                    offset_ms as f64 / total_ms as f64 * chart_width,
                    duration_ms.max(0) as f64 / total_ms as f64 * chart_width,
                )
            };

            TimelineBar {
                job_id: job.id.clone(),
                name: job.name.clone(),
                status: job.status,
                start_offset_px,
                width_px,
                duration_ms,
                duration_label: format_duration_ms(duration_ms),
            }
        })
        .collect();

    Timeline {
        started_at: Some(global_start),
        total_duration_ms: total_ms,
        chart_width_px: chart_width,
        bars,
        ticks: derive_ticks(total_ms, chart_width),
    }
}

#[allow(clippy::cast_precision_loss)]
fn derive_ticks(total_ms: i64, chart_width: f64) -> Vec<TimelineTick> {
    if total_ms == 0 {
        return Vec::new();
    }

    let interval = TICK_CANDIDATES_MS
        .into_iter()
        .find(|candidate| total_ms / candidate <= MAX_TICK_COUNT)
        .unwrap_or_else(|| (total_ms / 4).max(1));

    let mut ticks = Vec::new();
    let mut offset_ms = 0;
    while offset_ms <= total_ms {
        ticks.push(TimelineTick {
            offset_ms,
            x_px: offset_ms as f64 / total_ms as f64 * chart_width,
            label: format_duration_ms(offset_ms),
        });
        offset_ms += interval;
    }
    ticks
}
