//! Pure derived views over the resolved visit set.
//!
//! Recomputed from the current snapshot on every read; no caching and no
//! incremental maintenance.

use crate::types::Visit;

/// Aggregate statistics over a visit slice.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisitStats {
    pub count: usize,
    pub total_duration: u64,
    /// Rounded mean duration in minutes; 0 when there are no visits.
    pub average_duration: u64,
}

/// Compute totals and the rounded average duration.
pub fn aggregate(visits: &[Visit]) -> VisitStats {
    let count = visits.len();
    let total_duration: u64 = visits.iter().map(|v| u64::from(v.duration)).sum();
    let average_duration = if count > 0 {
        (total_duration as f64 / count as f64).round() as u64
    } else {
        0
    };

    VisitStats {
        count,
        total_duration,
        average_duration,
    }
}

/// Case-insensitive substring filter against the audio guide or visitor.
///
/// An empty term matches everything.
pub fn filter<'a>(visits: &'a [Visit], term: &str) -> Vec<&'a Visit> {
    let needle = term.to_lowercase();
    visits
        .iter()
        .filter(|v| {
            v.audio_guide.to_lowercase().contains(&needle)
                || v.visitor.as_str().to_lowercase().contains(&needle)
        })
        .collect()
}

/// One bar of the recent-durations chart.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartBar {
    /// Short id prefix used as the bar label.
    pub label: String,
    pub duration: u32,
    /// Bar width relative to the longest recent visit, in `0.0..=1.0`.
    pub fraction: f64,
}

/// Bars for the most recent visits, widths scaled against the longest
/// duration shown (with a floor of an hour so short lists stay readable).
pub fn duration_chart(visits: &[Visit], max_bars: usize) -> Vec<ChartBar> {
    let recent = &visits[..visits.len().min(max_bars)];
    let max_duration = recent.iter().map(|v| v.duration).max().unwrap_or(0).max(60);

    recent
        .iter()
        .map(|v| ChartBar {
            label: format!("#{}", v.id.short(4)),
            duration: v.duration,
            fraction: f64::from(v.duration) / f64::from(max_duration),
        })
        .collect()
}
