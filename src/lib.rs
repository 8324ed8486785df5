pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{http::FcaiClient, storage::LocalStorage};
pub use config::bylaw::{load_policy, write_default_bylaw};
pub use config::AppConfig;
pub use crate::core::engine::{GpaEngine, RunSummary};
pub use crate::core::grading::{
    compute_gpa, letter_from_percentage, normalize, normalize_all, standing_for,
};
pub use crate::core::pipeline::GpaPipeline;
pub use domain::model::{CourseEntry, Credentials, GpaResult, RawCourseRecord};
pub use domain::policy::{GradePolicy, StandingThreshold};
pub use utils::error::{GpaError, Result};
