use crate::domain::model::CourseEntry;
use crate::domain::ports::Storage;
use crate::utils::error::{GpaError, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

/// Courses as a pretty JSON array (four-space indent, UTF-8 kept as is).
pub fn courses_to_json(courses: &[CourseEntry]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    courses.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Courses as CSV with the same columns as the JSON output.
pub fn courses_to_csv(courses: &[CourseEntry]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for course in courses {
        writer.serialize(course)?;
    }
    writer.into_inner().map_err(|e| GpaError::IoError(e.into_error()))
}
