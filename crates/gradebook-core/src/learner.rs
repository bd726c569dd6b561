//! Learners: per-course scores, course completion and GPA.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::course::Course;
use crate::error::{require_name, GradebookError};
use crate::model::GradeRecord;
use crate::scale::{GradeScale, LetterGrade};

/// A student and their academic record.
///
/// A course id is in at most one of the current and completed sets. A final
/// letter exists only for a completed course.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Learner {
    username: String,
    current: BTreeSet<String>,
    completed: BTreeSet<String>,
    /// course id -> assignment name -> score
    grades: BTreeMap<String, BTreeMap<String, GradeRecord>>,
    final_letters: BTreeMap<String, LetterGrade>,
}

impl Learner {
    pub fn new(username: impl Into<String>) -> Result<Self, GradebookError> {
        let username = username.into();
        require_name(&username, "learner")?;
        Ok(Self {
            username,
            current: BTreeSet::new(),
            completed: BTreeSet::new(),
            grades: BTreeMap::new(),
            final_letters: BTreeMap::new(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    // -- course sets ----------------------------------------------------------

    /// Start taking a course. No-op if it is already current or completed.
    pub fn enroll(&mut self, course_id: &str) -> bool {
        if self.completed.contains(course_id) {
            tracing::info!(
                "{} already completed {course_id}, not re-enrolling",
                self.username
            );
            return false;
        }
        self.current.insert(course_id.to_string())
    }

    /// Stop taking a current course. Scores are kept.
    pub fn withdraw(&mut self, course_id: &str) -> bool {
        self.current.remove(course_id)
    }

    pub fn is_taking(&self, course_id: &str) -> bool {
        self.current.contains(course_id)
    }

    pub fn has_completed(&self, course_id: &str) -> bool {
        self.completed.contains(course_id)
    }

    pub fn current_courses(&self) -> Vec<String> {
        self.current.iter().cloned().collect()
    }

    pub fn completed_courses(&self) -> Vec<String> {
        self.completed.iter().cloned().collect()
    }

    /// Record a course finished before this learner was loaded.
    ///
    /// Removes it from the current set. `letter` may be absent, in which case
    /// the course does not count towards GPA.
    pub fn add_completed(&mut self, course_id: &str, letter: Option<LetterGrade>) {
        self.current.remove(course_id);
        self.completed.insert(course_id.to_string());
        match letter {
            Some(letter) => {
                self.final_letters.insert(course_id.to_string(), letter);
            }
            None => {
                self.final_letters.remove(course_id);
            }
        }
    }

    // -- scores ---------------------------------------------------------------

    /// Store a score, replacing any earlier one. Returns the replaced record.
    pub fn record_grade(
        &mut self,
        course_id: &str,
        assignment: &str,
        record: GradeRecord,
    ) -> Option<GradeRecord> {
        self.grades
            .entry(course_id.to_string())
            .or_default()
            .insert(assignment.to_string(), record)
    }

    pub fn remove_grade(&mut self, course_id: &str, assignment: &str) -> Option<GradeRecord> {
        let course = self.grades.get_mut(course_id)?;
        let removed = course.remove(assignment);
        if course.is_empty() {
            self.grades.remove(course_id);
        }
        removed
    }

    pub fn grade(&self, course_id: &str, assignment: &str) -> Option<&GradeRecord> {
        self.grades.get(course_id)?.get(assignment)
    }

    /// Read-only view of this learner's scores in one course.
    pub fn course_grades(&self, course_id: &str) -> Option<&BTreeMap<String, GradeRecord>> {
        self.grades.get(course_id)
    }

    /// Drop every score for a removed assignment.
    pub fn strike_assignment(&mut self, course_id: &str, assignment: &str) -> bool {
        self.remove_grade(course_id, assignment).is_some()
    }

    /// Move a score to an assignment's new name.
    pub fn rename_assignment(&mut self, course_id: &str, old: &str, new: &str) {
        if let Some(course) = self.grades.get_mut(course_id) {
            if let Some(record) = course.remove(old) {
                course.insert(new.to_string(), record);
            }
        }
    }

    // -- averages and completion ----------------------------------------------

    /// This learner's percentage in `course` under its active calculator.
    pub fn course_average(&self, course: &Course) -> f64 {
        course.average_for(self)
    }

    /// Finish a current course and store its letter grade permanently.
    ///
    /// Returns `None` without changing anything if the course is not current.
    /// The letter is not revisited when scores change later.
    pub fn complete_course(&mut self, course: &Course) -> Option<LetterGrade> {
        if !self.current.contains(course.id()) {
            tracing::info!(
                "{} is not taking {}, cannot complete it",
                self.username,
                course.id()
            );
            return None;
        }
        let percentage = course.average_for(self);
        let letter = GradeScale::from_percentage(percentage);
        self.current.remove(course.id());
        self.completed.insert(course.id().to_string());
        self.final_letters.insert(course.id().to_string(), letter);
        tracing::debug!(
            "{} completed {} with {percentage:.2}% ({letter})",
            self.username,
            course.id()
        );
        Some(letter)
    }

    pub fn final_letter(&self, course_id: &str) -> Option<LetterGrade> {
        self.final_letters.get(course_id).copied()
    }

    /// Stored letters by course id.
    pub fn final_letters(&self) -> BTreeMap<String, LetterGrade> {
        self.final_letters.clone()
    }

    /// Mean GPA points over completed courses that have a stored letter.
    pub fn calculate_gpa(&self) -> f64 {
        let points: Vec<f64> = self
            .completed
            .iter()
            .filter_map(|id| self.final_letters.get(id))
            .map(|letter| letter.gpa_points())
            .collect();
        if points.is_empty() {
            return 0.0;
        }
        points.iter().sum::<f64>() / points.len() as f64
    }
}
