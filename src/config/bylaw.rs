use crate::domain::policy::{GradePolicy, StandingThreshold};
use crate::utils::error::{GpaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub const DEFAULT_BYLAW_FILE: &str = "Bylaw.json";

/// On-disk shape of the bylaw file.
///
/// ```json
/// {
///     "grade_points": { "A+": 4.0, "A": 3.7 },
///     "gpa_general_grade": [ { "threshold": 3.5, "grade": "Excellent" } ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BylawFile {
    pub grade_points: BTreeMap<String, f64>,
    pub gpa_general_grade: Vec<StandingThreshold>,
}

impl BylawFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GpaError::IoError)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| GpaError::ConfigValidationError {
            field: "bylaw".to_string(),
            message: format!("Bylaw parsing error: {}", e),
        })
    }

    pub fn into_policy(self) -> Result<GradePolicy> {
        GradePolicy::new(self.grade_points, self.gpa_general_grade)
    }

    pub fn from_policy(policy: &GradePolicy) -> Self {
        Self {
            grade_points: policy.points_by_letter().clone(),
            gpa_general_grade: policy.standing_thresholds().to_vec(),
        }
    }

    /// 四格縮排、保留非 ASCII 字元
    pub fn to_pretty_json(&self) -> Result<String> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(buffer).map_err(|e| GpaError::ConfigError {
            message: format!("Bylaw serialization produced invalid UTF-8: {}", e),
        })
    }
}

/// Reads and validates a bylaw file, surfacing every problem as an error.
pub fn try_load_policy(path: &Path) -> Result<GradePolicy> {
    BylawFile::from_file(path)?.into_policy()
}

/// Loads the grading policy, falling back to the built-in default whenever
/// the file is absent, unreadable, malformed or fails validation. Never
/// fails.
pub fn load_policy(path: Option<&Path>) -> GradePolicy {
    let Some(path) = path else {
        tracing::info!("📜 No bylaw file configured, using the default grading policy");
        return GradePolicy::default();
    };

    if !path.exists() {
        tracing::warn!(
            "📜 Bylaw file {} not found, using the default grading policy",
            path.display()
        );
        return GradePolicy::default();
    }

    match try_load_policy(path) {
        Ok(policy) => {
            tracing::info!(
                "📜 Loaded bylaw from {} ({} letter grades, {} standing bands)",
                path.display(),
                policy.points_by_letter().len(),
                policy.standing_thresholds().len()
            );
            policy
        }
        Err(e) => {
            tracing::warn!(
                "⚠️ Error loading bylaw {}, using defaults: {}",
                path.display(),
                e
            );
            GradePolicy::default()
        }
    }
}

/// Writes the default policy to `path` unless a file already exists there.
/// Returns `true` when a file was created.
pub fn write_default_bylaw(path: &Path) -> Result<bool> {
    let content = BylawFile::from_policy(&GradePolicy::default()).to_pretty_json()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            tracing::debug!("Bylaw file {} already exists, leaving it untouched", path.display());
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    };

    file.write_all(content.as_bytes())?;
    tracing::info!("📝 Created default bylaw file at {}", path.display());
    Ok(true)
}
