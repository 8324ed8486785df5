use crate::adapters::storage::{courses_to_csv, courses_to_json};
use crate::core::grading::{compute_gpa, normalize_all};
use crate::core::{ConfigProvider, CourseProvider, Pipeline, Storage};
use crate::domain::model::{Credentials, GradeReport, RawCourseRecord};
use crate::domain::policy::GradePolicy;
use crate::utils::error::Result;
use std::path::Path;

/// Login → fetch → normalize → grade → save, for one student.
pub struct GpaPipeline<P: CourseProvider, S: Storage, C: ConfigProvider> {
    provider: P,
    storage: S,
    config: C,
    credentials: Credentials,
    policy: GradePolicy,
}

impl<P: CourseProvider, S: Storage, C: ConfigProvider> GpaPipeline<P, S, C> {
    pub fn new(
        provider: P,
        storage: S,
        config: C,
        credentials: Credentials,
        policy: GradePolicy,
    ) -> Self {
        Self {
            provider,
            storage,
            config,
            credentials,
            policy,
        }
    }
}

#[async_trait::async_trait]
impl<P: CourseProvider, S: Storage, C: ConfigProvider> Pipeline for GpaPipeline<P, S, C> {
    async fn extract(&self) -> Result<Vec<RawCourseRecord>> {
        let token = self.provider.authenticate(&self.credentials).await?;
        self.provider
            .fetch_courses(self.credentials.student_id(), &token)
            .await
    }

    async fn transform(&self, data: Vec<RawCourseRecord>) -> Result<GradeReport> {
        let batch = normalize_all(&data);
        if batch.skipped > 0 {
            tracing::warn!(
                "⚠️ {} of {} course records were skipped",
                batch.skipped,
                data.len()
            );
        }

        let gpa = compute_gpa(&batch.entries, &self.policy);

        Ok(GradeReport {
            courses: batch.entries,
            fetched_records: data.len(),
            skipped_records: batch.skipped,
            gpa,
        })
    }

    async fn load(&self, report: &GradeReport) -> Result<Vec<String>> {
        let mut written = Vec::new();
        let courses_file = self.config.courses_file();

        for format in self.config.output_formats() {
            let (file_name, data) = match format.as_str() {
                "json" => (courses_file.to_string(), courses_to_json(&report.courses)?),
                "csv" => (
                    Path::new(courses_file)
                        .with_extension("csv")
                        .to_string_lossy()
                        .into_owned(),
                    courses_to_csv(&report.courses)?,
                ),
                other => {
                    tracing::warn!("Unsupported output format '{}', skipping", other);
                    continue;
                }
            };

            tracing::debug!("Writing {} ({} bytes) to storage", file_name, data.len());
            self.storage.write_file(&file_name, &data).await?;

            let full_path = Path::new(self.config.output_path()).join(&file_name);
            tracing::info!("💾 Saved courses data to {}", full_path.display());
            written.push(full_path.to_string_lossy().into_owned());
        }

        Ok(written)
    }
}
