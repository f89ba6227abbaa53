//! Rule table for font-attributed text runs.
//!
//! Headings are runs set larger than the document's average size, in a bold
//! face, in capitals, or introduced by a division keyword. The level comes
//! from the size ratio alone.

use super::{char_len, is_uppercase, normalize, OutlineCollector};
use crate::model::{HeadingLevel, OutlineEntry};
use crate::parser::TextRun;

const DIVISION_PREFIXES: [&str; 3] = ["Chapter", "Section", "Part"];

const MIN_LEN_EXCLUSIVE: usize = 3;
const MAX_LEN: usize = 200;

const LARGE_RATIO: f32 = 1.2;
const H1_RATIO: f32 = 1.5;
const H2_RATIO: f32 = 1.3;
const H3_RATIO: f32 = 1.1;

/// Font size statistics over the kept runs of a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontStatistics {
    /// Mean font size
    pub average: f32,
    /// Number of runs measured
    pub samples: usize,
}

impl FontStatistics {
    /// Mean size of the given runs, or `None` if there are none.
    pub fn from_sizes(sizes: impl IntoIterator<Item = f32>) -> Option<Self> {
        let (sum, samples) = sizes
            .into_iter()
            .fold((0.0f64, 0usize), |(sum, n), size| (sum + f64::from(size), n + 1));
        (samples > 0).then(|| Self {
            average: (sum / samples as f64) as f32,
            samples,
        })
    }

    /// Level for a font size relative to the average.
    pub fn level_for(&self, size: f32) -> HeadingLevel {
        let ratio = if self.average > 0.0 {
            size / self.average
        } else {
            1.0
        };
        if ratio > H1_RATIO {
            HeadingLevel::H1
        } else if ratio > H2_RATIO {
            HeadingLevel::H2
        } else if ratio > H3_RATIO {
            HeadingLevel::H3
        } else {
            HeadingLevel::H4
        }
    }
}

/// Detect headings among text runs in reading order.
pub fn detect_headings(runs: &[TextRun], max: Option<usize>) -> Vec<OutlineEntry> {
    let kept: Vec<(String, &TextRun)> = runs
        .iter()
        .map(|run| (normalize(&run.text), run))
        .filter(|(text, _)| char_len(text) > MIN_LEN_EXCLUSIVE)
        .collect();

    let Some(stats) = FontStatistics::from_sizes(kept.iter().map(|(_, run)| run.font_size)) else {
        return Vec::new();
    };
    log::debug!(
        "Average font size {:.2} over {} runs",
        stats.average,
        stats.samples
    );

    let mut collector = OutlineCollector::new(max);
    for (text, run) in kept {
        if collector.is_full() {
            break;
        }
        if char_len(&text) > MAX_LEN {
            continue;
        }

        let is_heading = run.is_bold
            || run.font_size > stats.average * LARGE_RATIO
            || is_uppercase(&text)
            || DIVISION_PREFIXES.iter().any(|p| text.starts_with(p));
        if is_heading {
            collector.push(OutlineEntry::new(
                stats.level_for(run.font_size),
                text,
                run.page,
            ));
        }
    }

    collector.finish()
}
