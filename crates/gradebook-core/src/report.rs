//! Course reports with JSON persistence and change detection.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculator::{CategoryBased, CategoryResult, GradingPolicy};
use crate::gradebook::Gradebook;
use crate::scale::{GradeScale, LetterGrade};
use crate::statistics::{
    compute_assignment_stats, compute_course_statistics, AssignmentStats, CourseStatistics,
};

/// A snapshot of every enrolled learner's standing in one course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub course: CourseSummary,
    /// One row per enrolled learner, in username order.
    pub standings: Vec<Standing>,
    pub statistics: CourseStatistics,
    pub assignments: Vec<AssignmentStats>,
}

/// Summary of a course (without its assignments and scores).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSummary {
    pub id: String,
    pub name: String,
    pub semester: String,
    pub policy: GradingPolicy,
    /// Name of the active calculator, if any.
    pub calculator: Option<String>,
    pub assignment_count: usize,
}

/// A learner's current position in a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standing {
    pub username: String,
    pub percentage: f64,
    /// Letter the current percentage maps to.
    pub letter: LetterGrade,
    /// Letter stored when the course was completed, if it has been.
    #[serde(default)]
    pub final_letter: Option<LetterGrade>,
    #[serde(default)]
    pub dropped: Vec<String>,
    /// Per-category detail when the course uses categories.
    #[serde(default)]
    pub categories: Vec<CategoryResult>,
}

impl CourseReport {
    /// Build a report for `course_id`, or `None` if the course is unknown.
    pub fn build(book: &Gradebook, course_id: &str) -> Option<Self> {
        let course = book.course(course_id)?;
        let learners = book.enrolled_learners(course_id);

        let standings = learners
            .iter()
            .map(|learner| {
                let percentage = course.average_for(learner);
                Standing {
                    username: learner.username().to_string(),
                    percentage,
                    letter: GradeScale::from_percentage(percentage),
                    final_letter: learner.final_letter(course_id),
                    dropped: course.dropped_for(learner),
                    categories: CategoryBased.breakdown(course, learner),
                }
            })
            .collect();

        Some(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            course: CourseSummary {
                id: course.id().to_string(),
                name: course.name().to_string(),
                semester: course.semester().to_string(),
                policy: course.policy(),
                calculator: course.calculator().map(|c| c.name().to_string()),
                assignment_count: course.assignments().len(),
            },
            standings,
            statistics: compute_course_statistics(course, learners.iter().copied()),
            assignments: compute_assignment_stats(course),
        })
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: CourseReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the standings as a markdown table.
    pub fn to_markdown(&self, decimals: usize) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "## {}: {} ({})\n\n",
            self.course.id, self.course.name, self.course.semester
        ));
        md.push_str(&format!(
            "Policy: {} | Learners: {} | Mean: {:.*}% | Median: {:.*}%\n\n",
            self.course.policy,
            self.statistics.learner_count,
            decimals,
            self.statistics.mean,
            decimals,
            self.statistics.median
        ));

        md.push_str("| Learner | Percentage | Letter | Final | Dropped |\n");
        md.push_str("|---------|------------|--------|-------|---------|\n");
        for s in &self.standings {
            md.push_str(&format!(
                "| {} | {:.*}% | {} | {} | {} |\n",
                s.username,
                decimals,
                s.percentage,
                s.letter,
                s.final_letter.map(|l| l.to_string()).unwrap_or_default(),
                s.dropped.join(", ")
            ));
        }

        md
    }

    /// Compare this report against a baseline snapshot of the same course.
    ///
    /// `threshold` is in percentage points.
    pub fn compare(&self, baseline: &CourseReport, threshold: f64) -> ChangeReport {
        let index = |report: &CourseReport| -> HashMap<String, (f64, LetterGrade)> {
            report
                .standings
                .iter()
                .map(|s| (s.username.clone(), (s.percentage, s.letter)))
                .collect()
        };

        let baseline_scores = index(baseline);
        let current_scores = index(self);

        let mut declines = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_learners = 0usize;

        for s in &self.standings {
            let Some(&(before, before_letter)) = baseline_scores.get(&s.username) else {
                new_learners += 1;
                continue;
            };
            let delta = s.percentage - before;
            let change = StandingChange {
                username: s.username.clone(),
                baseline_percentage: before,
                current_percentage: s.percentage,
                baseline_letter: before_letter,
                current_letter: s.letter,
                delta,
            };
            if delta < -threshold {
                declines.push(change);
            } else if delta > threshold {
                improvements.push(change);
            } else {
                unchanged += 1;
            }
        }

        let removed_learners = baseline_scores
            .keys()
            .filter(|k| !current_scores.contains_key(*k))
            .count();

        ChangeReport {
            course_id: self.course.id.clone(),
            declines,
            improvements,
            unchanged,
            new_learners,
            removed_learners,
        }
    }
}

/// Result of comparing two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeReport {
    pub course_id: String,
    /// Learners whose percentage went down.
    pub declines: Vec<StandingChange>,
    /// Learners whose percentage went up.
    pub improvements: Vec<StandingChange>,
    /// Learners with no significant change.
    pub unchanged: usize,
    /// Learners in current but not baseline.
    pub new_learners: usize,
    /// Learners in baseline but not current.
    pub removed_learners: usize,
}

/// A learner whose percentage moved past the threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingChange {
    pub username: String,
    pub baseline_percentage: f64,
    pub current_percentage: f64,
    pub baseline_letter: LetterGrade,
    pub current_letter: LetterGrade,
    pub delta: f64,
}

impl ChangeReport {
    /// Format the change report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} declines, {} improvements, {} unchanged\n\n",
            self.declines.len(),
            self.improvements.len(),
            self.unchanged
        ));

        for (title, rows) in [
            ("Declines", &self.declines),
            ("Improvements", &self.improvements),
        ] {
            if rows.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Learner | Baseline | Current | Delta |\n");
            md.push_str("|---------|----------|---------|-------|\n");
            for c in rows {
                md.push_str(&format!(
                    "| {} | {:.1}% ({}) | {:.1}% ({}) | {:+.1} |\n",
                    c.username,
                    c.baseline_percentage,
                    c.baseline_letter,
                    c.current_percentage,
                    c.current_letter,
                    c.delta
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if any learner's percentage declined.
    pub fn has_declines(&self) -> bool {
        !self.declines.is_empty()
    }
}
