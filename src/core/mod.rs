pub mod engine;
pub mod grading;
pub mod pipeline;

pub use crate::domain::model::{CourseEntry, GpaResult, GradeReport, RawCourseRecord};
pub use crate::domain::ports::{ConfigProvider, CourseProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
