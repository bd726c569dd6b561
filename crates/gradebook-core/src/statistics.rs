//! Course and assignment statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::course::Course;
use crate::learner::Learner;
use crate::scale::{GradeScale, LetterGrade};

/// Distribution of current averages across a course's enrolled learners.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseStatistics {
    pub learner_count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// How many learners currently sit at each letter.
    pub letter_distribution: BTreeMap<LetterGrade, usize>,
}

/// Summary of the scores recorded for one assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentStats {
    pub name: String,
    pub category: String,
    pub graded: bool,
    pub points_possible: f64,
    /// Number of learners with a recorded score.
    pub scored: usize,
    pub mean_points: Option<f64>,
    pub mean_percentage: Option<f64>,
}

/// Statistics over a set of percentages. Empty input yields all zeros.
pub fn summarize(percentages: &[f64]) -> CourseStatistics {
    if percentages.is_empty() {
        return CourseStatistics::default();
    }

    let mut sorted = percentages.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };

    let mut letter_distribution = BTreeMap::new();
    for &p in &sorted {
        *letter_distribution
            .entry(GradeScale::from_percentage(p))
            .or_insert(0) += 1;
    }

    CourseStatistics {
        learner_count: n,
        mean: sorted.iter().sum::<f64>() / n as f64,
        median,
        min: sorted[0],
        max: sorted[n - 1],
        letter_distribution,
    }
}

/// Statistics of the current averages of `learners` in `course`.
pub fn compute_course_statistics<'a>(
    course: &Course,
    learners: impl IntoIterator<Item = &'a Learner>,
) -> CourseStatistics {
    let percentages: Vec<f64> = learners
        .into_iter()
        .map(|learner| course.average_for(learner))
        .collect();
    summarize(&percentages)
}

/// Per-assignment statistics in course order.
pub fn compute_assignment_stats(course: &Course) -> Vec<AssignmentStats> {
    course
        .assignments()
        .iter()
        .map(|a| {
            let mean_points = a.mean_points();
            AssignmentStats {
                name: a.name().to_string(),
                category: a.category().to_string(),
                graded: a.is_graded(),
                points_possible: a.points_possible(),
                scored: a.scored_count(),
                mean_points,
                mean_percentage: mean_points.map(|m| m / a.points_possible() * 100.0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradebook::Gradebook;
    use crate::model::Assignment;

    #[test]
    fn summarize_empty_is_zeroed() {
        let stats = summarize(&[]);
        assert_eq!(stats.learner_count, 0);
        assert_eq!(stats.mean, 0.0);
        assert!(stats.letter_distribution.is_empty());
    }

    #[test]
    fn summarize_odd_and_even() {
        let odd = summarize(&[72.0, 95.0, 81.0]);
        assert_eq!(odd.median, 81.0);
        assert_eq!(odd.min, 72.0);
        assert_eq!(odd.max, 95.0);
        assert!((odd.mean - 82.666_666_666).abs() < 1e-6);
        assert_eq!(odd.letter_distribution.get(&LetterGrade::A), Some(&1));
        assert_eq!(odd.letter_distribution.get(&LetterGrade::B), Some(&1));
        assert_eq!(odd.letter_distribution.get(&LetterGrade::C), Some(&1));

        let even = summarize(&[50.0, 60.0, 70.0, 80.0]);
        assert_eq!(even.median, 65.0);
        assert_eq!(even.letter_distribution.get(&LetterGrade::F), Some(&1));
    }

    #[test]
    fn course_and_assignment_stats() {
        let mut book = Gradebook::new();
        book.add_course(Course::new("CS101", "Intro", "Fall 2026", false).unwrap());
        for name in ["alice", "bob"] {
            book.add_learner(Learner::new(name).unwrap());
            book.enroll("CS101", name);
        }
        book.add_assignment(
            "CS101",
            Assignment::new("Exam", 50.0, "").unwrap().graded(true),
        );
        book.add_assignment("CS101", Assignment::new("Draft", 10.0, "").unwrap());
        book.record_grade("CS101", "alice", "Exam", 45.0, None).unwrap();
        book.record_grade("CS101", "bob", "Exam", 35.0, None).unwrap();

        let course = book.course("CS101").unwrap();
        let stats = compute_course_statistics(course, book.enrolled_learners("CS101"));
        assert_eq!(stats.learner_count, 2);
        assert!((stats.mean - 80.0).abs() < 1e-9);

        let per_assignment = compute_assignment_stats(course);
        assert_eq!(per_assignment.len(), 2);
        assert_eq!(per_assignment[0].scored, 2);
        assert_eq!(per_assignment[0].mean_points, Some(40.0));
        assert!((per_assignment[0].mean_percentage.unwrap() - 80.0).abs() < 1e-9);
        assert_eq!(per_assignment[1].mean_points, None);
        assert!(!per_assignment[1].graded);
    }
}
