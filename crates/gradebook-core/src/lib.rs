//! gradebook-core: Grade aggregation engine, grading policies, and reports.
//!
//! This crate defines the courses, assignments, learners and grading
//! categories of a gradebook, the calculators that turn recorded scores into
//! percentages, and the letter-grade scale that maps percentages to letters
//! and GPA points.

pub mod calculator;
pub mod category;
pub mod config;
pub mod course;
pub mod error;
pub mod events;
pub mod gradebook;
pub mod learner;
pub mod model;
pub mod parser;
pub mod report;
pub mod scale;
pub mod statistics;
pub mod traits;

pub use calculator::{CategoryBased, GradingPolicy, PointsBased};
pub use config::{load_config, GradebookConfig, OutputFormat};
pub use course::Course;
pub use error::GradebookError;
pub use gradebook::Gradebook;
pub use learner::Learner;
pub use scale::{GradeScale, LetterGrade};
