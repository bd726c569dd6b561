//! Core data model types for gradebook.
//!
//! Grade records and assignment definitions. Courses, categories and learners
//! build on these.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{require_name, GradebookError};

/// A single recorded score and its optional feedback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeRecord {
    points_earned: f64,
    feedback: Option<String>,
}

impl GradeRecord {
    /// Create a record. Negative or non-finite points are rejected.
    pub fn new(points_earned: f64, feedback: Option<String>) -> Result<Self, GradebookError> {
        validate_points(points_earned)?;
        Ok(Self {
            points_earned,
            feedback,
        })
    }

    pub fn points_earned(&self) -> f64 {
        self.points_earned
    }

    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    pub fn set_points(&mut self, points_earned: f64) -> Result<(), GradebookError> {
        validate_points(points_earned)?;
        self.points_earned = points_earned;
        Ok(())
    }

    pub fn set_feedback(&mut self, feedback: Option<String>) {
        self.feedback = feedback;
    }
}

fn validate_points(points: f64) -> Result<(), GradebookError> {
    if !points.is_finite() || points < 0.0 {
        return Err(GradebookError::InvalidPoints(points));
    }
    Ok(())
}

/// An assignment definition within a course.
///
/// Holds the scores recorded against it, keyed by learner username. A learner
/// keeps an equal copy of each of its own scores; both are written by the same
/// recording action on [`crate::gradebook::Gradebook`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    name: String,
    points_possible: f64,
    due_date: String,
    category: String,
    group: String,
    /// Only graded assignments count towards any average.
    graded: bool,
    grades: BTreeMap<String, GradeRecord>,
}

impl Assignment {
    /// Create an ungraded assignment with no scores.
    pub fn new(
        name: impl Into<String>,
        points_possible: f64,
        category: impl Into<String>,
    ) -> Result<Self, GradebookError> {
        let name = name.into();
        require_name(&name, "assignment")?;
        validate_points_possible(points_possible)?;
        Ok(Self {
            name,
            points_possible,
            due_date: String::new(),
            category: category.into(),
            group: String::new(),
            graded: false,
            grades: BTreeMap::new(),
        })
    }

    /// Builder-style due date.
    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = due_date.into();
        self
    }

    /// Builder-style group label.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Builder-style graded flag.
    pub fn graded(mut self, graded: bool) -> Self {
        self.graded = graded;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points_possible(&self) -> f64 {
        self.points_possible
    }

    pub fn due_date(&self) -> &str {
        &self.due_date
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn is_graded(&self) -> bool {
        self.graded
    }

    pub fn set_points_possible(&mut self, points_possible: f64) -> Result<(), GradebookError> {
        validate_points_possible(points_possible)?;
        self.points_possible = points_possible;
        Ok(())
    }

    pub fn set_due_date(&mut self, due_date: impl Into<String>) {
        self.due_date = due_date.into();
    }

    pub fn set_group(&mut self, group: impl Into<String>) {
        self.group = group.into();
    }

    pub fn set_graded(&mut self, graded: bool) {
        self.graded = graded;
    }

    // Renames and category moves go through `Course` so category membership
    // stays in step.
    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_category(&mut self, category: String) {
        self.category = category;
    }

    /// The score recorded for `username`, if any.
    pub fn grade(&self, username: &str) -> Option<&GradeRecord> {
        self.grades.get(username)
    }

    /// Read-only view of all recorded scores.
    pub fn grades(&self) -> &BTreeMap<String, GradeRecord> {
        &self.grades
    }

    /// Number of learners with a recorded score.
    pub fn scored_count(&self) -> usize {
        self.grades.len()
    }

    /// Mean points earned across recorded scores.
    pub fn mean_points(&self) -> Option<f64> {
        if self.grades.is_empty() {
            return None;
        }
        let total: f64 = self.grades.values().map(GradeRecord::points_earned).sum();
        Some(total / self.grades.len() as f64)
    }

    pub(crate) fn put_grade(&mut self, username: &str, record: GradeRecord) {
        self.grades.insert(username.to_string(), record);
    }

    pub(crate) fn take_grade(&mut self, username: &str) -> Option<GradeRecord> {
        self.grades.remove(username)
    }
}

fn validate_points_possible(points: f64) -> Result<(), GradebookError> {
    if !points.is_finite() || points <= 0.0 {
        return Err(GradebookError::InvalidPointsPossible(points));
    }
    Ok(())
}
