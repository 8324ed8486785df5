use serde::{Deserialize, Serialize};

/// A course record as returned by the student-courses endpoint.
///
/// Every field is optional at this stage; the normalizer decides which ones
/// are required. `numOfHours` and `result` show up both as JSON numbers and
/// as numeric strings, so they are kept as raw values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCourseRecord {
    pub course: Option<RawCourse>,
    pub level: Option<NamedRef>,
    pub term: Option<NamedRef>,
    pub grade: Option<String>,
    pub result: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCourse {
    pub code: Option<String>,
    pub name: Option<String>,
    pub arabic_name: Option<String>,
    pub num_of_hours: Option<serde_json::Value>,
    #[serde(rename = "type")]
    pub course_type: Option<NamedRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: Option<String>,
}

impl NamedRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseEntry {
    pub code: String,
    pub name: String,
    pub arabic_name: Option<String>,
    pub hours: u32,
    pub grade: Option<String>,
    pub result: Option<f64>,
    #[serde(rename = "type")]
    pub course_type: String,
    pub level: String,
    pub term: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpaResult {
    pub total_points: f64,
    pub total_hours: u32,
    /// Rounded to two decimals.
    pub gpa: f64,
    pub counted_courses: usize,
    pub standing: String,
}

/// Output of normalizing a whole batch of raw records.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub entries: Vec<CourseEntry>,
    pub skipped: usize,
}

/// 轉換階段的產出，交給 load 階段寫入
#[derive(Debug, Clone)]
pub struct GradeReport {
    pub courses: Vec<CourseEntry>,
    pub fetched_records: usize,
    pub skipped_records: usize,
    pub gpa: GpaResult,
}

/// Portal login. The username doubles as the student id.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn student_id(&self) -> &str {
        &self.username
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Bearer token returned by the login endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}
