use serde::Serialize;
use std::fmt;

use crate::models::{AnnotationResult, ConfidenceTier};

/// One row of the per-region score table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRow {
    pub label_index: usize,
    pub region: String,
    /// Score rounded to two decimals.
    pub confidence: f64,
    pub tier: ConfidenceTier,
}

/// Counts and score table shown next to the annotated image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Briefing {
    pub total_count: usize,
    pub kept_count: usize,
    pub threshold: f32,
    pub rows: Vec<ScoreRow>,
}

fn round2(score: f32) -> f64 {
    (score as f64 * 100.0).round() / 100.0
}

impl Briefing {
    pub fn from_result(result: &AnnotationResult, threshold: f32) -> Self {
        let rows = result
            .kept
            .iter()
            .map(|k| ScoreRow {
                label_index: k.label_index,
                region: format!("Region {}", k.label_index),
                confidence: round2(k.score()),
                tier: k.tier,
            })
            .collect();

        Self {
            total_count: result.total_count,
            kept_count: result.kept_count,
            threshold,
            rows,
        }
    }

    /// No region passed the threshold. Informational, not a failure.
    pub fn is_empty_result(&self) -> bool {
        self.kept_count == 0
    }

    pub fn empty_notice(&self) -> String {
        format!("No region exceeded the confidence threshold of {:.2}.", self.threshold)
    }
}

impl fmt::Display for Briefing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Stenosis Detection Briefing ===")?;
        writeln!(f, "Regions detected by the model: {}", self.total_count)?;
        writeln!(
            f,
            "Regions kept (confidence >= {:.2}): {}",
            self.threshold, self.kept_count
        )?;

        if self.is_empty_result() {
            return writeln!(f, "{}", self.empty_notice());
        }

        writeln!(f)?;
        writeln!(f, "{:<12} {:>10}", "Region", "Confidence")?;
        for row in &self.rows {
            writeln!(f, "{:<12} {:>10.2}", row.region, row.confidence)?;
        }
        Ok(())
    }
}
