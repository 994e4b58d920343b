//! Fill-level heatmap: readings bucketed per calendar day into four
//! percentage bands.
//!
//! For every day in the range, each sensor contributes its most recent
//! reading taken on or before that day. Sensors without such a reading are
//! left out for that day, so the four counts of a day always sum to the number
//! of sensors that have reported by then.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::model::Reading;

/// One of four fixed percentage ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Band {
    #[serde(rename = "0-24")]
    Low,
    #[serde(rename = "25-49")]
    Medium,
    #[serde(rename = "50-74")]
    High,
    #[serde(rename = "75-100")]
    Full,
}

impl Band {
    pub const ALL: [Band; 4] = [Band::Low, Band::Medium, Band::High, Band::Full];

    /// Band containing `level`. Out-of-range levels clamp to the outer bands.
    pub fn of(level: f64) -> Self {
        if level < 25.0 {
            Band::Low
        } else if level < 50.0 {
            Band::Medium
        } else if level < 75.0 {
            Band::High
        } else {
            Band::Full
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Band::Low => "0-24",
            Band::Medium => "25-49",
            Band::High => "50-74",
            Band::Full => "75-100",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Number of sensors in `band` on `day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeatmapCell {
    pub day: NaiveDate,
    pub band: Band,
    pub count: usize,
}

/// Aggregate over the full range of days covered by `readings`.
///
/// Returns four cells per day, ordered by day then band. Empty input gives
/// empty output.
pub fn aggregate(readings: &[Reading]) -> Vec<HeatmapCell> {
    let Some((first, last)) = day_span(readings) else {
        return Vec::new();
    };
    aggregate_range(readings, first, last)
}

/// First and last day with a usable reading. Non-finite levels are ignored,
/// the same readings [`aggregate_range`] skips.
pub fn day_span(readings: &[Reading]) -> Option<(NaiveDate, NaiveDate)> {
    let days = readings
        .iter()
        .filter(|r| r.level.is_finite())
        .map(|r| r.timestamp.date_naive());
    Some((days.clone().min()?, days.max()?))
}

/// Aggregate over `from..=to`.
///
/// Readings before `from` still count as the latest known value of their
/// sensor. Readings after `to` are ignored. Non-finite levels are skipped.
pub fn aggregate_range(readings: &[Reading], from: NaiveDate, to: NaiveDate) -> Vec<HeatmapCell> {
    if from > to {
        return Vec::new();
    }

    let mut sorted: Vec<&Reading> = readings.iter().filter(|r| r.level.is_finite()).collect();
    // Stable: equal timestamps keep input order, so the later entry wins.
    sorted.sort_by_key(|r| r.timestamp);

    let mut latest: HashMap<&str, Band> = HashMap::new();
    let mut counts = [0usize; 4];
    let mut next = 0;
    let mut cells = Vec::new();

    for day in from.iter_days().take_while(|d| *d <= to) {
        while let Some(reading) = sorted.get(next) {
            if reading.timestamp.date_naive() > day {
                break;
            }
            let band = Band::of(reading.level);
            if let Some(previous) = latest.insert(reading.sensor_id.as_str(), band) {
                counts[previous.index()] -= 1;
            }
            counts[band.index()] += 1;
            next += 1;
        }

        cells.extend(Band::ALL.iter().map(|&band| HeatmapCell {
            day,
            band,
            count: counts[band.index()],
        }));
    }

    debug!(
        readings = sorted.len(),
        sensors = latest.len(),
        days = cells.len() / Band::ALL.len(),
        "heatmap aggregated"
    );
    cells
}

/// One day of the heatmap, counts indexed by [`Band::index`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatmapRow {
    pub day: NaiveDate,
    pub counts: [usize; 4],
}

impl HeatmapRow {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Day-major view over aggregated cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Heatmap {
    rows: Vec<HeatmapRow>,
}

impl Heatmap {
    pub fn from_cells(cells: &[HeatmapCell]) -> Self {
        let mut rows: Vec<HeatmapRow> = Vec::new();
        for cell in cells {
            match rows.last_mut() {
                Some(row) if row.day == cell.day => row.counts[cell.band.index()] = cell.count,
                _ => {
                    let mut counts = [0; 4];
                    counts[cell.band.index()] = cell.count;
                    rows.push(HeatmapRow {
                        day: cell.day,
                        counts,
                    });
                }
            }
        }
        Self { rows }
    }

    pub fn build(readings: &[Reading]) -> Self {
        Self::from_cells(&aggregate(readings))
    }

    pub fn rows(&self) -> &[HeatmapRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
