use serde::{Deserialize, Serialize};

/// Score of one completed session; `None` means "not scored".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreRecord {
    score: Option<f64>,
}

impl ScoreRecord {
    #[must_use]
    pub fn new(score: Option<f64>) -> Self {
        Self { score }
    }

    #[must_use]
    pub fn score(&self) -> Option<f64> {
        self.score
    }
}

/// Dashboard aggregate over completed sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub count: u64,
    pub average_score: i64,
}

impl ScoreSummary {
    /// Count the records and compute their rounded mean.
    ///
    /// The input is trusted to contain completed sessions only. Unscored
    /// records add zero to the sum but still count toward the mean.
    /// Rounding is half away from zero (`f64::round`).
    #[must_use]
    pub fn aggregate(records: &[ScoreRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let sum: f64 = records.iter().map(|r| r.score.unwrap_or(0.0)).sum();
        #[allow(clippy::cast_precision_loss)]
        let mean = sum / records.len() as f64;

        #[allow(clippy::cast_possible_truncation)]
        let average_score = mean.round() as i64;

        Self {
            count: records.len() as u64,
            average_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(scores: &[Option<f64>]) -> Vec<ScoreRecord> {
        scores.iter().copied().map(ScoreRecord::new).collect()
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(
            ScoreSummary::aggregate(&[]),
            ScoreSummary {
                count: 0,
                average_score: 0
            }
        );
    }

    #[test]
    fn unscored_records_count_toward_mean() {
        let summary = ScoreSummary::aggregate(&records(&[Some(80.0), Some(90.0), None]));
        assert_eq!(summary.count, 3);
        // 170 / 3 = 56.67
        assert_eq!(summary.average_score, 57);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        // 81 / 2 = 40.5
        let summary = ScoreSummary::aggregate(&records(&[Some(40.0), Some(41.0)]));
        assert_eq!(summary.average_score, 41);

        // 85 / 2 = 42.5
        let summary = ScoreSummary::aggregate(&records(&[Some(42.0), Some(43.0)]));
        assert_eq!(summary.average_score, 43);
    }

    #[test]
    fn all_unscored_averages_zero() {
        let summary = ScoreSummary::aggregate(&records(&[None, None]));
        assert_eq!(summary.count, 2);
        assert_eq!(summary.average_score, 0);
    }

    #[test]
    fn serializes_camel_case() {
        let summary = ScoreSummary::aggregate(&records(&[Some(100.0)]));
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json, serde_json::json!({ "count": 1, "averageScore": 100 }));
    }
}
