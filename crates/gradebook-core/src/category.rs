//! Weighted grading categories and drop-lowest selection.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{require_name, GradebookError};
use crate::model::{Assignment, GradeRecord};

/// A named slice of the final grade.
///
/// Weight and drop count are fixed at construction; changing either means
/// replacing the category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradingCategory {
    name: String,
    weight: f64,
    drop_lowest: u32,
    /// Member assignment names in the order they joined.
    members: Vec<String>,
}

impl GradingCategory {
    /// Create a category. `weight` is a fraction of the final grade.
    pub fn new(
        name: impl Into<String>,
        weight: f64,
        drop_lowest: u32,
    ) -> Result<Self, GradebookError> {
        let name = name.into();
        require_name(&name, "category")?;
        if !(0.0..=1.0).contains(&weight) {
            return Err(GradebookError::WeightOutOfRange(weight));
        }
        Ok(Self {
            name,
            weight,
            drop_lowest,
            members: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn drop_lowest(&self) -> u32 {
        self.drop_lowest
    }

    /// Member assignment names, in membership order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn contains(&self, assignment: &str) -> bool {
        self.members.iter().any(|m| m == assignment)
    }

    pub(crate) fn add_member(&mut self, assignment: &str) {
        if !self.contains(assignment) {
            self.members.push(assignment.to_string());
        }
    }

    pub(crate) fn remove_member(&mut self, assignment: &str) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != assignment);
        self.members.len() != before
    }

    pub(crate) fn rename_member(&mut self, old: &str, new: &str) {
        if let Some(slot) = self.members.iter_mut().find(|m| *m == old) {
            *slot = new.to_string();
        }
    }

    /// Select the learner's lowest-scoring assignments to exclude.
    ///
    /// Only graded assignments with a recorded score are candidates. The sort
    /// is stable, so equal scores keep their `members` order and the earliest
    /// ones are dropped first. Returns them lowest first.
    pub fn dropped<'a>(
        &self,
        members: &[&'a Assignment],
        scores: Option<&BTreeMap<String, GradeRecord>>,
    ) -> Vec<&'a Assignment> {
        if self.drop_lowest == 0 {
            return Vec::new();
        }
        let Some(scores) = scores else {
            return Vec::new();
        };

        let mut eligible: Vec<(&'a Assignment, f64)> = members
            .iter()
            .filter(|a| a.is_graded())
            .filter_map(|a| scores.get(a.name()).map(|g| (*a, g.points_earned())))
            .collect();
        eligible.sort_by(|a, b| a.1.total_cmp(&b.1));

        let count = (self.drop_lowest as usize).min(eligible.len());
        eligible.into_iter().take(count).map(|(a, _)| a).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graded(name: &str) -> Assignment {
        Assignment::new(name, 10.0, "Homework").unwrap().graded(true)
    }

    fn scores(entries: &[(&str, f64)]) -> BTreeMap<String, GradeRecord> {
        entries
            .iter()
            .map(|(name, pts)| (name.to_string(), GradeRecord::new(*pts, None).unwrap()))
            .collect()
    }

    fn names(dropped: &[&Assignment]) -> Vec<String> {
        dropped.iter().map(|a| a.name().to_string()).collect()
    }

    #[test]
    fn construction_validates_weight_and_name() {
        assert_eq!(
            GradingCategory::new("Homework", 1.5, 0),
            Err(GradebookError::WeightOutOfRange(1.5))
        );
        assert!(GradingCategory::new("Homework", -0.1, 0).is_err());
        assert!(GradingCategory::new("Homework", f64::NAN, 0).is_err());
        assert_eq!(
            GradingCategory::new(" ", 0.5, 0),
            Err(GradebookError::EmptyName("category"))
        );
        let cat = GradingCategory::new("Homework", 0.0, 2).unwrap();
        assert_eq!(cat.weight(), 0.0);
        assert_eq!(cat.drop_lowest(), 2);
    }

    #[test]
    fn drops_lowest_scores() {
        let cat = GradingCategory::new("Homework", 0.5, 1).unwrap();
        let (a, b, c) = (graded("HW1"), graded("HW2"), graded("HW3"));
        let members = [&a, &b, &c];
        let s = scores(&[("HW1", 8.0), ("HW2", 6.0), ("HW3", 9.0)]);
        assert_eq!(names(&cat.dropped(&members, Some(&s))), vec!["HW2"]);
    }

    #[test]
    fn zero_drop_count_drops_nothing() {
        let cat = GradingCategory::new("Quizzes", 0.5, 0).unwrap();
        let a = graded("Q1");
        let s = scores(&[("Q1", 1.0)]);
        assert!(cat.dropped(&[&a], Some(&s)).is_empty());
    }

    #[test]
    fn drop_count_larger_than_eligible_drops_all() {
        let cat = GradingCategory::new("Homework", 0.5, 5).unwrap();
        let (a, b) = (graded("HW1"), graded("HW2"));
        let s = scores(&[("HW1", 8.0), ("HW2", 6.0)]);
        assert_eq!(names(&cat.dropped(&[&a, &b], Some(&s))), vec!["HW2", "HW1"]);
    }

    #[test]
    fn unscored_and_ungraded_are_never_dropped() {
        let cat = GradingCategory::new("Homework", 0.5, 2).unwrap();
        let scored = graded("HW1");
        let unscored = graded("HW2");
        let ungraded = Assignment::new("HW3", 10.0, "Homework").unwrap();
        let s = scores(&[("HW1", 9.0), ("HW3", 0.0)]);
        let dropped = cat.dropped(&[&scored, &unscored, &ungraded], Some(&s));
        assert_eq!(names(&dropped), vec!["HW1"]);
    }

    #[test]
    fn ties_break_by_member_order() {
        let cat = GradingCategory::new("Homework", 0.5, 1).unwrap();
        let (a, b, c) = (graded("HW1"), graded("HW2"), graded("HW3"));
        let s = scores(&[("HW1", 9.0), ("HW2", 5.0), ("HW3", 5.0)]);
        assert_eq!(names(&cat.dropped(&[&a, &b, &c], Some(&s))), vec!["HW2"]);
        assert_eq!(names(&cat.dropped(&[&a, &c, &b], Some(&s))), vec!["HW3"]);
    }

    #[test]
    fn no_scores_drops_nothing() {
        let cat = GradingCategory::new("Homework", 0.5, 1).unwrap();
        let a = graded("HW1");
        assert!(cat.dropped(&[&a], None).is_empty());
    }

    #[test]
    fn membership_is_ordered_and_unique() {
        let mut cat = GradingCategory::new("Homework", 0.5, 0).unwrap();
        cat.add_member("HW2");
        cat.add_member("HW1");
        cat.add_member("HW2");
        assert_eq!(cat.members(), ["HW2", "HW1"]);
        cat.rename_member("HW2", "Essay");
        assert_eq!(cat.members(), ["Essay", "HW1"]);
        assert!(cat.remove_member("HW1"));
        assert!(!cat.remove_member("HW1"));
        assert!(cat.contains("Essay"));
    }
}
