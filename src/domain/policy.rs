use crate::utils::error::{GpaError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MAX_GRADE_POINTS: f64 = 4.0;

/// One GPA band: every GPA at or above `threshold` (and below the next
/// higher band) earns `label`.
///
/// Serialized in the bylaw file as `{"threshold": 3.5, "grade": "Excellent"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingThreshold {
    pub threshold: f64,
    #[serde(rename = "grade")]
    pub label: String,
}

impl StandingThreshold {
    pub fn new(threshold: f64, label: impl Into<String>) -> Self {
        Self {
            threshold,
            label: label.into(),
        }
    }
}

/// The grading bylaw: letter → point table and the GPA → standing bands.
///
/// Built once through [`GradePolicy::new`] (or [`Default`]) and never
/// mutated afterwards, so a single instance can be shared read-only between
/// any number of GPA computations. Construction guarantees:
///
/// - every point value is finite and within `0.0..=4.0`;
/// - there is at least one standing threshold;
/// - thresholds are sorted descending and the lowest one is `<= 0.0`, so
///   every non-negative GPA matches a band.
#[derive(Debug, Clone, PartialEq)]
pub struct GradePolicy {
    points_by_letter: BTreeMap<String, f64>,
    standing_thresholds: Vec<StandingThreshold>,
}

impl GradePolicy {
    pub fn new(
        points_by_letter: BTreeMap<String, f64>,
        mut standing_thresholds: Vec<StandingThreshold>,
    ) -> Result<Self> {
        for (letter, points) in &points_by_letter {
            validate_non_empty_string("grade_points", letter)?;
            validate_range(
                &format!("grade_points.{}", letter),
                *points,
                0.0,
                MAX_GRADE_POINTS,
            )?;
        }

        if standing_thresholds.is_empty() {
            return Err(GpaError::ConfigValidationError {
                field: "gpa_general_grade".to_string(),
                message: "at least one standing threshold is required".to_string(),
            });
        }

        for entry in &standing_thresholds {
            if !entry.threshold.is_finite() {
                return Err(GpaError::InvalidConfigValueError {
                    field: "gpa_general_grade.threshold".to_string(),
                    value: entry.threshold.to_string(),
                    reason: "Threshold must be a finite number".to_string(),
                });
            }
            validate_non_empty_string("gpa_general_grade.grade", &entry.label)?;
        }

        // 檔案中的順序不可靠，一律依門檻由高到低排序
        standing_thresholds.sort_by(|a, b| b.threshold.total_cmp(&a.threshold));

        let lowest = standing_thresholds
            .last()
            .map(|entry| entry.threshold)
            .unwrap_or(f64::INFINITY);
        if lowest > 0.0 {
            return Err(GpaError::InvalidConfigValueError {
                field: "gpa_general_grade.threshold".to_string(),
                value: lowest.to_string(),
                reason: "The lowest threshold must be 0.0 or below".to_string(),
            });
        }

        Ok(Self {
            points_by_letter,
            standing_thresholds,
        })
    }

    pub fn points_for(&self, letter: &str) -> Option<f64> {
        self.points_by_letter.get(letter).copied()
    }

    pub fn points_by_letter(&self) -> &BTreeMap<String, f64> {
        &self.points_by_letter
    }

    /// Thresholds in descending order.
    pub fn standing_thresholds(&self) -> &[StandingThreshold] {
        &self.standing_thresholds
    }

    /// Label of the lowest band.
    pub fn lowest_standing(&self) -> &str {
        self.standing_thresholds
            .last()
            .map(|entry| entry.label.as_str())
            .unwrap_or_default()
    }
}

pub fn default_grade_points() -> BTreeMap<String, f64> {
    [
        ("A+", 4.0),
        ("A", 3.7),
        ("B+", 3.3),
        ("B", 3.0),
        ("C+", 2.7),
        ("C", 2.4),
        ("D+", 2.2),
        ("D", 2.0),
        ("F", 0.0),
    ]
    .into_iter()
    .map(|(letter, points)| (letter.to_string(), points))
    .collect()
}

pub fn default_standing_thresholds() -> Vec<StandingThreshold> {
    vec![
        StandingThreshold::new(3.5, "Excellent"),
        StandingThreshold::new(3.0, "Very Good"),
        StandingThreshold::new(2.5, "Good"),
        StandingThreshold::new(2.0, "Acceptable"),
        StandingThreshold::new(1.5, "Weak"),
        StandingThreshold::new(0.0, "Very Weak"),
    ]
}

impl Default for GradePolicy {
    fn default() -> Self {
        // 預設表已排序且最低門檻為 0.0，直接建構
        Self {
            points_by_letter: default_grade_points(),
            standing_thresholds: default_standing_thresholds(),
        }
    }
}
