//! TOML gradebook loader.
//!
//! Loads courses, assignments, scores and learner history from TOML files,
//! and validates the result.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::category::GradingCategory;
use crate::course::Course;
use crate::gradebook::Gradebook;
use crate::learner::Learner;
use crate::model::Assignment;
use crate::scale::LetterGrade;

/// Intermediate TOML structure for parsing gradebook files.
#[derive(Debug, Deserialize)]
struct TomlGradebookFile {
    #[serde(default)]
    courses: Vec<TomlCourse>,
    #[serde(default)]
    learners: Vec<TomlLearner>,
}

#[derive(Debug, Deserialize)]
struct TomlCourse {
    id: String,
    name: String,
    #[serde(default)]
    semester: String,
    #[serde(default)]
    uses_categories: bool,
    #[serde(default)]
    roster: Vec<String>,
    #[serde(default)]
    categories: Vec<TomlCategory>,
    #[serde(default)]
    assignments: Vec<TomlAssignment>,
    #[serde(default)]
    grades: Vec<TomlGrade>,
}

#[derive(Debug, Deserialize)]
struct TomlCategory {
    name: String,
    weight: f64,
    #[serde(default)]
    drop_lowest: u32,
}

#[derive(Debug, Deserialize)]
struct TomlAssignment {
    name: String,
    points_possible: f64,
    #[serde(default)]
    due_date: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    group: String,
    #[serde(default)]
    graded: bool,
}

#[derive(Debug, Deserialize)]
struct TomlGrade {
    learner: String,
    assignment: String,
    points: f64,
    #[serde(default)]
    feedback: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlLearner {
    username: String,
    #[serde(default)]
    completed: Vec<TomlCompleted>,
}

#[derive(Debug, Deserialize)]
struct TomlCompleted {
    course: String,
    #[serde(default)]
    letter: Option<String>,
}

/// Parse a single TOML file into a `Gradebook`.
pub fn parse_gradebook(path: &Path) -> Result<Gradebook> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read gradebook file: {}", path.display()))?;

    parse_gradebook_str(&content, path)
}

/// Parse a TOML string into a `Gradebook` (useful for testing).
///
/// Unlike the engine, which ignores requests naming unknown entities, the
/// loader treats a dangling reference in the file as an error.
pub fn parse_gradebook_str(content: &str, source_path: &Path) -> Result<Gradebook> {
    let parsed: TomlGradebookFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let mut book = Gradebook::new();

    // Learners first so history is in place before rosters enroll them.
    for l in &parsed.learners {
        let mut learner = Learner::new(l.username.as_str())
            .with_context(|| format!("invalid learner in {}", source_path.display()))?;
        for done in &l.completed {
            let letter = done
                .letter
                .as_deref()
                .map(str::parse::<LetterGrade>)
                .transpose()
                .map_err(|e| {
                    anyhow::anyhow!("learner '{}', course '{}': {e}", l.username, done.course)
                })?;
            learner.add_completed(&done.course, letter);
        }
        anyhow::ensure!(
            book.add_learner(learner),
            "duplicate learner '{}' in {}",
            l.username,
            source_path.display()
        );
    }

    for c in parsed.courses {
        load_course(&mut book, c)
            .with_context(|| format!("invalid course in {}", source_path.display()))?;
    }

    Ok(book)
}

fn load_course(book: &mut Gradebook, c: TomlCourse) -> Result<()> {
    let course_id = c.id.clone();
    let mut course = Course::new(c.id, c.name, c.semester, c.uses_categories)?;

    for cat in c.categories {
        let name = cat.name.clone();
        let category = GradingCategory::new(cat.name, cat.weight, cat.drop_lowest)
            .with_context(|| format!("course '{course_id}', category '{name}'"))?;
        anyhow::ensure!(
            course.add_category(category),
            "course '{course_id}': duplicate category '{name}'"
        );
    }
    anyhow::ensure!(
        book.add_course(course),
        "duplicate course id '{course_id}'"
    );

    for a in c.assignments {
        let name = a.name.clone();
        let assignment = Assignment::new(a.name, a.points_possible, a.category)
            .with_context(|| format!("course '{course_id}', assignment '{name}'"))?
            .with_due_date(a.due_date)
            .with_group(a.group)
            .graded(a.graded);
        anyhow::ensure!(
            book.add_assignment(&course_id, assignment),
            "course '{course_id}': duplicate assignment '{name}'"
        );
    }

    for username in &c.roster {
        if book.learner(username).is_none() {
            book.add_learner(Learner::new(username.as_str())?);
        }
        book.enroll(&course_id, username);
    }

    for g in c.grades {
        let course = book
            .course(&course_id)
            .context("course vanished while loading")?;
        anyhow::ensure!(
            course.is_enrolled(&g.learner),
            "course '{course_id}': grade for '{}', who is not on the roster",
            g.learner
        );
        anyhow::ensure!(
            course.assignment(&g.assignment).is_some(),
            "course '{course_id}': grade for unknown assignment '{}'",
            g.assignment
        );
        book.record_grade(&course_id, &g.learner, &g.assignment, g.points, g.feedback)
            .with_context(|| {
                format!(
                    "course '{course_id}': grade for '{}' on '{}'",
                    g.learner, g.assignment
                )
            })?;
    }

    Ok(())
}

/// A warning from gradebook validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The course ID (if applicable).
    pub course_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn course(course_id: &str, message: impl Into<String>) -> Self {
        Self {
            course_id: Some(course_id.to_string()),
            message: message.into(),
        }
    }
}

/// Validate a gradebook for common issues.
pub fn validate_gradebook(book: &Gradebook) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for course in book.courses() {
        let id = course.id();

        if course.uses_categories() {
            let has_categories = course.categories().next().is_some();
            if !has_categories {
                warnings.push(ValidationWarning::course(
                    id,
                    "uses categories but defines none; every average will be 0",
                ));
            } else if (course.total_weight() - 1.0).abs() > 1e-6 {
                warnings.push(ValidationWarning::course(
                    id,
                    format!(
                        "category weights sum to {:.2}, not 1.00",
                        course.total_weight()
                    ),
                ));
            }

            let names: HashSet<&str> = course.categories().map(|c| c.name()).collect();
            for a in course.assignments() {
                if !names.contains(a.category()) {
                    warnings.push(ValidationWarning::course(
                        id,
                        format!(
                            "assignment '{}' has category '{}', which does not exist",
                            a.name(),
                            a.category()
                        ),
                    ));
                }
            }
        }

        for a in course.assignments() {
            if a.is_graded() && a.scored_count() == 0 {
                warnings.push(ValidationWarning::course(
                    id,
                    format!("assignment '{}' is graded but has no scores", a.name()),
                ));
            }
            for (username, record) in a.grades() {
                if record.points_earned() > a.points_possible() {
                    warnings.push(ValidationWarning::course(
                        id,
                        format!(
                            "{username} scored {} on '{}', above {} possible",
                            record.points_earned(),
                            a.name(),
                            a.points_possible()
                        ),
                    ));
                }
            }
        }
    }

    warnings
}
