use crate::core::Pipeline;
use crate::domain::model::GpaResult;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub gpa: GpaResult,
    pub fetched_records: usize,
    pub skipped_records: usize,
    /// Empty when saving failed or no output format was configured.
    pub saved_files: Vec<String>,
    pub finished_at: DateTime<Utc>,
}

pub struct GpaEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> GpaEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("🚀 Starting GPA calculation");

        let raw_data = self.pipeline.extract().await?;
        if raw_data.is_empty() {
            tracing::warn!("No courses data retrieved");
        }

        let report = self.pipeline.transform(raw_data).await?;
        tracing::info!(
            "✅ Normalized {} courses, {} counted towards the GPA",
            report.courses.len(),
            report.gpa.counted_courses
        );

        // 存檔失敗不影響 GPA 結果
        let saved_files = match self.pipeline.load(&report).await {
            Ok(paths) => paths,
            Err(e) => {
                tracing::error!("❌ Error saving courses: {}", e);
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                Vec::new()
            }
        };

        Ok(RunSummary {
            gpa: report.gpa,
            fetched_records: report.fetched_records,
            skipped_records: report.skipped_records,
            saved_files,
            finished_at: Utc::now(),
        })
    }
}
