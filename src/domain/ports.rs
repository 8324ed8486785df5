use crate::domain::model::{AuthToken, Credentials, GradeReport, RawCourseRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    fn courses_file(&self) -> &str;
    fn output_formats(&self) -> &[String];
}

/// Source of raw course records, typically the student portal API.
#[async_trait]
pub trait CourseProvider: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthToken>;
    async fn fetch_courses(
        &self,
        student_id: &str,
        token: &AuthToken,
    ) -> Result<Vec<RawCourseRecord>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawCourseRecord>>;
    async fn transform(&self, data: Vec<RawCourseRecord>) -> Result<GradeReport>;
    /// Returns the paths that were written.
    async fn load(&self, report: &GradeReport) -> Result<Vec<String>>;
}
