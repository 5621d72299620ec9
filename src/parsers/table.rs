//! Profiling-table extraction for the generic runner
//!
//! The table is located by a line starting with `Average` and closed by the
//! second `=`-led separator line that follows it. Rows start three lines
//! after the `Average` marker.

use crate::error::{BenchError, Result};
use crate::types::LayerTiming;
use tracing::{debug, trace};

const AVERAGE_MARKER: &str = "Average";
const SEPARATOR: char = '=';
const NAME_COLUMN: usize = 0;
const TIME_COLUMN: usize = 3;

/// Layer rows of a profiling table
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    pub layers: Vec<LayerTiming>,
    /// Sum of all row times. Reported downstream as `mean_time`.
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Idle,
    Armed { start: usize, separator_seen: bool },
    Closed { start: usize, end: usize },
}

/// Parser for the generic runner's free-form report
pub struct TableOutputParser;

impl TableOutputParser {
    /// Extract the per-layer timing table.
    ///
    /// # Errors
    ///
    /// Returns `BenchError::TableNotFound` when no `Average` marker exists, the
    /// table is never closed, or the table holds no well-formed rows.
    pub fn parse(raw: &str) -> Result<ParsedTable> {
        let lines: Vec<&str> = raw.lines().collect();
        let (start, end) = match Self::locate(&lines) {
            ScanState::Closed { start, end } => (start, end),
            state => {
                debug!(?state, "Profiling table not closed");
                return Err(BenchError::TableNotFound);
            },
        };

        let rows = lines.get(start + 1..end).unwrap_or_default();
        let layers: Vec<LayerTiming> = rows.iter().filter_map(|row| Self::parse_row(row)).collect();
        if layers.is_empty() {
            return Err(BenchError::TableNotFound);
        }

        let total = layers.iter().map(|layer| layer.time).sum();
        Ok(ParsedTable { layers, total })
    }

    fn locate(lines: &[&str]) -> ScanState {
        let mut state = ScanState::Idle;
        for (index, line) in lines.iter().enumerate() {
            state = match state {
                ScanState::Idle if line.starts_with(AVERAGE_MARKER) => ScanState::Armed {
                    start: index + 2,
                    separator_seen: false,
                },
                ScanState::Armed {
                    start,
                    separator_seen,
                } if line.starts_with(SEPARATOR) => {
                    if separator_seen {
                        ScanState::Closed { start, end: index }
                    } else {
                        ScanState::Armed {
                            start,
                            separator_seen: true,
                        }
                    }
                },
                ScanState::Closed { .. } => break,
                other => other,
            };
        }
        state
    }

    fn parse_row(row: &str) -> Option<LayerTiming> {
        let tokens: Vec<&str> = row
            .split('\t')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect();
        let name = tokens.get(NAME_COLUMN)?;
        let time = tokens.get(TIME_COLUMN)?;
        match time.parse::<f64>() {
            Ok(time) => Some(LayerTiming::new(*name, time)),
            Err(_) => {
                trace!(row = %row, "Skipping non-numeric table row");
                None
            },
        }
    }
}
