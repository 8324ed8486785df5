use crate::domain::model::{CourseEntry, GpaResult, NamedRef, NormalizedBatch, RawCourseRecord};
use crate::domain::policy::GradePolicy;
use crate::utils::error::{GpaError, Result};
use serde_json::Value;

/// Converts a percentage result into a letter grade using the faculty's
/// fixed cutoffs. Each band includes its lower bound.
///
/// | Range       | Grade |
/// |-------------|-------|
/// | >= 90       | A+    |
/// | >= 85       | A     |
/// | >= 80       | B+    |
/// | >= 75       | B     |
/// | >= 70       | C+    |
/// | >= 65       | C     |
/// | >= 60       | D+    |
/// | >= 50       | D     |
/// | < 50        | F     |
///
/// These cutoffs are independent of the loaded [`GradePolicy`].
pub fn letter_from_percentage(p: f64) -> &'static str {
    match p {
        p if p >= 90.0 => "A+",
        p if p >= 85.0 => "A",
        p if p >= 80.0 => "B+",
        p if p >= 75.0 => "B",
        p if p >= 70.0 => "C+",
        p if p >= 65.0 => "C",
        p if p >= 60.0 => "D+",
        p if p >= 50.0 => "D",
        _ => "F",
    }
}

fn missing(field: &str) -> GpaError {
    GpaError::MissingFieldError {
        field: field.to_string(),
    }
}

fn required_name(named: Option<&NamedRef>, field: &str) -> Result<String> {
    named
        .and_then(|n| n.name.clone())
        .ok_or_else(|| missing(field))
}

fn parse_hours(value: &Value) -> Result<u32> {
    let invalid = || GpaError::InvalidHoursError {
        value: value.to_string(),
    };

    match value {
        Value::Null => Err(missing("course.numOfHours")),
        Value::Number(n) => {
            if let Some(hours) = n.as_u64() {
                return u32::try_from(hours).map_err(|_| invalid());
            }
            // 3.0 這類整數值的浮點數也接受
            match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => Ok(f as u32),
                _ => Err(invalid()),
            }
        }
        Value::String(s) => s.trim().parse::<u32>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn parse_percentage(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|p| p.is_finite())
}

/// Projects a raw portal record onto a [`CourseEntry`].
///
/// Fails with `MissingFieldError` when the course code, name, hours, type,
/// level or term is absent, and with `InvalidHoursError` when the hours are
/// not a non-negative integer. When the record has no letter grade but does
/// have a numeric result, the grade is derived with
/// [`letter_from_percentage`].
pub fn normalize(raw: &RawCourseRecord) -> Result<CourseEntry> {
    let course = raw.course.as_ref().ok_or_else(|| missing("course"))?;

    let code = course.code.clone().ok_or_else(|| missing("course.code"))?;
    let name = course.name.clone().ok_or_else(|| missing("course.name"))?;
    let hours = course
        .num_of_hours
        .as_ref()
        .ok_or_else(|| missing("course.numOfHours"))
        .and_then(parse_hours)?;
    let course_type = required_name(course.course_type.as_ref(), "course.type.name")?;
    let level = required_name(raw.level.as_ref(), "level.name")?;
    let term = required_name(raw.term.as_ref(), "term.name")?;

    let result = match raw.result.as_ref() {
        None | Some(Value::Null) => None,
        Some(value) => {
            let parsed = parse_percentage(value);
            if parsed.is_none() {
                tracing::warn!("Course {} has a non-numeric result {}, ignoring it", code, value);
            }
            parsed
        }
    };

    let grade = raw
        .grade
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .or_else(|| result.map(|p| letter_from_percentage(p).to_string()));

    Ok(CourseEntry {
        code,
        name,
        arabic_name: course.arabic_name.clone(),
        hours,
        grade,
        result,
        course_type,
        level,
        term,
    })
}

/// Normalizes every record, skipping (and logging) the ones that fail.
pub fn normalize_all(records: &[RawCourseRecord]) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();

    for (index, raw) in records.iter().enumerate() {
        let error = match normalize(raw) {
            Ok(entry) => {
                batch.entries.push(entry);
                continue;
            }
            Err(e) => e,
        };

        let code = raw
            .course
            .as_ref()
            .and_then(|c| c.code.as_deref())
            .unwrap_or("<unknown>");
        if error.is_record_error() {
            tracing::warn!("⚠️ Skipping course record #{} ({}): {}", index, code, error);
        } else {
            tracing::error!("❌ Unexpected error on course record #{} ({}): {}", index, code, error);
        }
        batch.skipped += 1;
    }

    batch
}

/// Label of the first band (highest threshold first) whose threshold is at
/// or below `gpa`. Falls back to the lowest band for negative input.
pub fn standing_for(policy: &GradePolicy, gpa: f64) -> &str {
    policy
        .standing_thresholds()
        .iter()
        .find(|entry| entry.threshold <= gpa)
        .map(|entry| entry.label.as_str())
        .unwrap_or_else(|| policy.lowest_standing())
}

fn round2(value: f64) -> f64 {
    // 恰好落在中點時取偶數
    (value * 100.0).round_ties_even() / 100.0
}

/// Credit-hour weighted GPA over `entries`.
///
/// Courses without a grade, or with a letter the policy does not know (for
/// example "W"), are left out of every total. The standing is matched
/// against the unrounded GPA; only the reported `gpa` field is rounded.
pub fn compute_gpa(entries: &[CourseEntry], policy: &GradePolicy) -> GpaResult {
    let mut total_points = 0.0;
    let mut total_hours: u32 = 0;
    let mut counted_courses = 0;

    for entry in entries {
        let Some(grade) = entry.grade.as_deref() else {
            tracing::debug!("Course {} has no grade yet, not counted", entry.code);
            continue;
        };
        let Some(points) = policy.points_for(grade) else {
            tracing::debug!(
                "Course {} has grade '{}' outside the bylaw, not counted",
                entry.code,
                grade
            );
            continue;
        };

        total_points += points * f64::from(entry.hours);
        total_hours = total_hours.saturating_add(entry.hours);
        counted_courses += 1;
    }

    let gpa = if total_hours > 0 {
        total_points / f64::from(total_hours)
    } else {
        0.0
    };

    GpaResult {
        total_points,
        total_hours,
        gpa: round2(gpa),
        counted_courses,
        standing: standing_for(policy, gpa).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RawCourse;
    use crate::domain::policy::{default_grade_points, StandingThreshold};

    fn raw_record(grade: Option<&str>, result: Option<Value>, hours: Value) -> RawCourseRecord {
        RawCourseRecord {
            course: Some(RawCourse {
                code: Some("CS213".to_string()),
                name: Some("Object Oriented Programming".to_string()),
                arabic_name: Some("البرمجة الشيئية".to_string()),
                num_of_hours: Some(hours),
                course_type: Some(NamedRef::named("Compulsory")),
            }),
            level: Some(NamedRef::named("Level 2")),
            term: Some(NamedRef::named("First Term")),
            grade: grade.map(str::to_string),
            result,
        }
    }

    fn entry(code: &str, grade: Option<&str>, hours: u32) -> CourseEntry {
        CourseEntry {
            code: code.to_string(),
            name: code.to_string(),
            arabic_name: None,
            hours,
            grade: grade.map(str::to_string),
            result: None,
            course_type: "Compulsory".to_string(),
            level: "Level 1".to_string(),
            term: "First Term".to_string(),
        }
    }

    #[test]
    fn test_letter_from_percentage_boundaries() {
        assert_eq!(letter_from_percentage(100.0), "A+");
        assert_eq!(letter_from_percentage(90.0), "A+");
        assert_eq!(letter_from_percentage(89.999), "A");
        assert_eq!(letter_from_percentage(85.0), "A");
        assert_eq!(letter_from_percentage(84.9), "B+");
        assert_eq!(letter_from_percentage(80.0), "B+");
        assert_eq!(letter_from_percentage(75.0), "B");
        assert_eq!(letter_from_percentage(70.0), "C+");
        assert_eq!(letter_from_percentage(65.0), "C");
        assert_eq!(letter_from_percentage(60.0), "D+");
        assert_eq!(letter_from_percentage(50.0), "D");
        assert_eq!(letter_from_percentage(49.999), "F");
        assert_eq!(letter_from_percentage(-5.0), "F");
    }

    #[test]
    fn test_letter_from_percentage_is_monotonic() {
        let policy = GradePolicy::default();
        let mut previous = f64::INFINITY;
        let mut p = 100.0;
        while p >= 0.0 {
            let points = policy.points_for(letter_from_percentage(p)).unwrap();
            assert!(points <= previous, "quality rose at {}%", p);
            previous = points;
            p -= 0.25;
        }
    }

    #[test]
    fn test_normalize_derives_grade_from_result() {
        let raw = raw_record(None, Some(serde_json::json!(82)), serde_json::json!(3));
        let entry = normalize(&raw).unwrap();

        assert_eq!(entry.grade.as_deref(), Some("B+"));
        assert_eq!(entry.result, Some(82.0));
        assert_eq!(entry.hours, 3);
        assert_eq!(entry.arabic_name.as_deref(), Some("البرمجة الشيئية"));

        let gpa = compute_gpa(&[entry], &GradePolicy::default());
        assert_eq!(gpa.counted_courses, 1);
    }

    #[test]
    fn test_normalize_keeps_recorded_grade() {
        let raw = raw_record(Some("A"), Some(serde_json::json!(55)), serde_json::json!(3));
        assert_eq!(normalize(&raw).unwrap().grade.as_deref(), Some("A"));
    }

    #[test]
    fn test_normalize_accepts_string_numbers() {
        let raw = raw_record(None, Some(serde_json::json!("91.5")), serde_json::json!("4"));
        let entry = normalize(&raw).unwrap();
        assert_eq!(entry.hours, 4);
        assert_eq!(entry.grade.as_deref(), Some("A+"));
    }

    #[test]
    fn test_normalize_without_grade_or_result() {
        let raw = raw_record(None, None, serde_json::json!(2));
        let entry = normalize(&raw).unwrap();
        assert_eq!(entry.grade, None);
        assert_eq!(entry.result, None);
    }

    #[test]
    fn test_normalize_missing_field() {
        let mut raw = raw_record(Some("A"), None, serde_json::json!(3));
        raw.term = None;

        match normalize(&raw) {
            Err(GpaError::MissingFieldError { field }) => assert_eq!(field, "term.name"),
            other => panic!("expected MissingFieldError, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_invalid_hours() {
        for hours in [serde_json::json!("three"), serde_json::json!(-1), serde_json::json!(2.5)] {
            let raw = raw_record(Some("A"), None, hours);
            assert!(matches!(
                normalize(&raw),
                Err(GpaError::InvalidHoursError { .. })
            ));
        }
    }

    #[test]
    fn test_normalize_all_skips_bad_records() {
        let mut broken = raw_record(Some("A"), None, serde_json::json!(3));
        broken.course = None;

        let records = vec![
            raw_record(Some("A"), None, serde_json::json!(3)),
            broken,
            raw_record(None, Some(serde_json::json!(70)), serde_json::json!("x")),
            raw_record(Some("B"), None, serde_json::json!(2)),
        ];

        for record in &records {
            if let Err(e) = normalize(record) {
                assert!(e.is_record_error(), "{:?} should be skippable", e);
            }
        }

        let batch = normalize_all(&records);
        assert_eq!(batch.entries.len(), 2);
        assert_eq!(batch.skipped, 2);
    }

    #[test]
    fn test_compute_gpa_empty() {
        let policy = GradePolicy::default();
        let result = compute_gpa(&[], &policy);

        assert_eq!(result.total_points, 0.0);
        assert_eq!(result.total_hours, 0);
        assert_eq!(result.gpa, 0.0);
        assert_eq!(result.counted_courses, 0);
        assert_eq!(result.standing, "Very Weak");
    }

    #[test]
    fn test_compute_gpa_weighted_average() {
        let entries = vec![entry("CS101", Some("A"), 3), entry("MA101", Some("B+"), 4)];
        let result = compute_gpa(&entries, &GradePolicy::default());

        assert!((result.total_points - 24.3).abs() < 1e-9);
        assert_eq!(result.total_hours, 7);
        assert_eq!(result.gpa, 3.47);
        assert_eq!(result.counted_courses, 2);
        assert_eq!(result.standing, "Very Good");
    }

    #[test]
    fn test_compute_gpa_skips_unknown_and_missing_grades() {
        let entries = vec![
            entry("CS101", Some("A+"), 3),
            entry("HU111", Some("W"), 2),
            entry("IS211", None, 3),
        ];
        let result = compute_gpa(&entries, &GradePolicy::default());

        assert_eq!(result.total_hours, 3);
        assert_eq!(result.counted_courses, 1);
        assert_eq!(result.gpa, 4.0);
        assert_eq!(result.standing, "Excellent");
    }

    #[test]
    fn test_compute_gpa_is_idempotent() {
        let entries = vec![entry("CS101", Some("C"), 3), entry("MA101", Some("D+"), 3)];
        let policy = GradePolicy::default();
        assert_eq!(compute_gpa(&entries, &policy), compute_gpa(&entries, &policy));
    }

    #[test]
    fn test_zero_hour_course_is_counted_without_weight() {
        let entries = vec![entry("SEM01", Some("A"), 0)];
        let result = compute_gpa(&entries, &GradePolicy::default());
        assert_eq!(result.counted_courses, 1);
        assert_eq!(result.total_hours, 0);
        assert_eq!(result.gpa, 0.0);
    }

    #[test]
    fn test_standing_for_is_total() {
        let policy = GradePolicy::default();
        let mut gpa = 0.0;
        while gpa <= 4.0 {
            assert!(!standing_for(&policy, gpa).is_empty());
            gpa += 0.01;
        }
        assert_eq!(standing_for(&policy, 3.5), "Excellent");
        assert_eq!(standing_for(&policy, 3.49), "Very Good");
        assert_eq!(standing_for(&policy, 0.0), "Very Weak");
    }

    #[test]
    fn test_standing_for_negative_gpa_falls_back_to_lowest() {
        let thresholds = vec![
            StandingThreshold::new(2.0, "Pass"),
            StandingThreshold::new(-1.0, "Fail"),
        ];
        let policy = GradePolicy::new(default_grade_points(), thresholds).unwrap();
        assert_eq!(standing_for(&policy, -3.0), "Fail");
        assert_eq!(standing_for(&GradePolicy::default(), -0.5), "Very Weak");
    }

    #[test]
    fn test_standing_uses_unrounded_gpa() {
        // 3.496 會四捨五入為 3.5，但等第仍依原值判定
        let policy = GradePolicy::default();
        assert_eq!(standing_for(&policy, 3.496), "Very Good");
        assert_eq!(round2(3.496), 3.5);
    }

    #[test]
    fn test_gpa_halfway_rounds_to_even() {
        // 25 / 8 = 3.125，恰好位於 3.12 與 3.13 中間
        let entries = vec![
            entry("CS101", Some("A+"), 4),
            entry("MA101", Some("B"), 3),
            entry("HU111", Some("F"), 1),
        ];
        let result = compute_gpa(&entries, &GradePolicy::default());

        assert_eq!(result.total_points, 25.0);
        assert_eq!(result.total_hours, 8);
        assert_eq!(result.gpa, 3.12);
        assert_eq!(round2(2.625), 2.62);
        assert_eq!(round2(2.375), 2.38);
    }
}
