//! Courses: assignments, categories, roster and the active calculator.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use crate::calculator::GradingPolicy;
use crate::category::GradingCategory;
use crate::error::{require_name, GradebookError};
use crate::learner::Learner;
use crate::model::Assignment;
use crate::traits::GradeCalculator;

/// A course offering.
///
/// When `uses_categories` is false the categories are inert: they are kept
/// and maintained, but only a calculator that checks the flag decides whether
/// they count.
#[derive(Clone)]
pub struct Course {
    id: String,
    name: String,
    semester: String,
    uses_categories: bool,
    roster: BTreeSet<String>,
    assignments: Vec<Assignment>,
    categories: BTreeMap<String, GradingCategory>,
    calculator: Option<Arc<dyn GradeCalculator>>,
}

impl Course {
    /// Create an empty course whose calculator matches `uses_categories`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        semester: impl Into<String>,
        uses_categories: bool,
    ) -> Result<Self, GradebookError> {
        let id = id.into();
        let name = name.into();
        require_name(&id, "course id")?;
        require_name(&name, "course")?;
        Ok(Self {
            id,
            name,
            semester: semester.into(),
            uses_categories,
            roster: BTreeSet::new(),
            assignments: Vec::new(),
            categories: BTreeMap::new(),
            calculator: Some(GradingPolicy::from_flag(uses_categories).calculator()),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn semester(&self) -> &str {
        &self.semester
    }

    pub fn uses_categories(&self) -> bool {
        self.uses_categories
    }

    /// Flip the category toggle without touching the calculator.
    pub fn set_uses_categories(&mut self, uses_categories: bool) {
        self.uses_categories = uses_categories;
    }

    /// Set the toggle and install the matching calculator.
    pub fn set_policy(&mut self, policy: GradingPolicy) {
        self.uses_categories = policy.uses_categories();
        self.calculator = Some(policy.calculator());
    }

    /// The policy implied by the category toggle.
    pub fn policy(&self) -> GradingPolicy {
        GradingPolicy::from_flag(self.uses_categories)
    }

    // -- calculator ---------------------------------------------------------

    /// Replace the active calculator. No check is made that it agrees with
    /// `uses_categories`.
    pub fn set_calculator(&mut self, calculator: Option<Arc<dyn GradeCalculator>>) {
        self.calculator = calculator;
    }

    pub fn calculator(&self) -> Option<Arc<dyn GradeCalculator>> {
        self.calculator.clone()
    }

    /// The learner's percentage under the active calculator, `0.0` if none.
    pub fn average_for(&self, learner: &Learner) -> f64 {
        match &self.calculator {
            Some(calc) => calc.final_average(self, learner),
            None => {
                tracing::debug!("course {} has no calculator configured", self.id);
                0.0
            }
        }
    }

    /// Assignments the active calculator excludes for the learner.
    pub fn dropped_for(&self, learner: &Learner) -> Vec<String> {
        self.calculator
            .as_ref()
            .map(|calc| calc.dropped(self, learner))
            .unwrap_or_default()
    }

    // -- roster -------------------------------------------------------------

    /// Add a learner to the roster. Returns `false` if already enrolled.
    pub fn enroll(&mut self, username: &str) -> bool {
        self.roster.insert(username.to_string())
    }

    /// Remove a learner from the roster. Returns `false` if not enrolled.
    pub fn unenroll(&mut self, username: &str) -> bool {
        self.roster.remove(username)
    }

    pub fn is_enrolled(&self, username: &str) -> bool {
        self.roster.contains(username)
    }

    /// Enrolled usernames in sorted order.
    pub fn roster(&self) -> Vec<String> {
        self.roster.iter().cloned().collect()
    }

    // -- assignments --------------------------------------------------------

    /// Add an assignment, joining the category named by its label if one
    /// exists. Rejects a duplicate name, keeping the first.
    pub fn add_assignment(&mut self, assignment: Assignment) -> bool {
        if self.assignment(assignment.name()).is_some() {
            tracing::info!(
                "course {} already has assignment '{}', ignoring",
                self.id,
                assignment.name()
            );
            return false;
        }
        if let Some(category) = self.categories.get_mut(assignment.category()) {
            category.add_member(assignment.name());
        }
        self.assignments.push(assignment);
        true
    }

    /// Remove an assignment from its category and from the course.
    ///
    /// Learner-held scores are not touched here; see
    /// [`crate::gradebook::Gradebook::remove_assignment`].
    pub fn remove_assignment(&mut self, name: &str) -> Option<Assignment> {
        let index = self.assignments.iter().position(|a| a.name() == name)?;
        for category in self.categories.values_mut() {
            category.remove_member(name);
        }
        Some(self.assignments.remove(index))
    }

    /// Rename an assignment, keeping category membership.
    pub fn rename_assignment(&mut self, old: &str, new: &str) -> Result<bool, GradebookError> {
        require_name(new, "assignment")?;
        if old == new || self.assignment(new).is_some() {
            return Ok(false);
        }
        let Some(assignment) = self.assignments.iter_mut().find(|a| a.name() == old) else {
            return Ok(false);
        };
        assignment.set_name(new.to_string());
        for category in self.categories.values_mut() {
            category.rename_member(old, new);
        }
        Ok(true)
    }

    /// Point an assignment at a different category label, moving membership.
    pub fn recategorize_assignment(&mut self, name: &str, category: &str) -> bool {
        let Some(assignment) = self.assignments.iter_mut().find(|a| a.name() == name) else {
            return false;
        };
        assignment.set_category(category.to_string());
        for cat in self.categories.values_mut() {
            cat.remove_member(name);
        }
        self.rebuild_membership(category);
        true
    }

    pub fn assignment(&self, name: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.name() == name)
    }

    pub fn assignment_mut(&mut self, name: &str) -> Option<&mut Assignment> {
        self.assignments.iter_mut().find(|a| a.name() == name)
    }

    /// Assignments in the order they were added.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    // -- categories ---------------------------------------------------------

    /// Add a category. Assignments already labelled with its name join it in
    /// course order. Rejects a duplicate name, keeping the first.
    pub fn add_category(&mut self, category: GradingCategory) -> bool {
        if self.categories.contains_key(category.name()) {
            tracing::info!(
                "course {} already has category '{}', ignoring",
                self.id,
                category.name()
            );
            return false;
        }
        let name = category.name().to_string();
        self.categories.insert(name.clone(), category);
        self.rebuild_membership(&name);
        true
    }

    /// Remove a category. Its assignments stay in the course.
    pub fn remove_category(&mut self, name: &str) -> Option<GradingCategory> {
        self.categories.remove(name)
    }

    pub fn category(&self, name: &str) -> Option<&GradingCategory> {
        self.categories.get(name)
    }

    /// Categories in name order.
    pub fn categories(&self) -> impl Iterator<Item = &GradingCategory> {
        self.categories.values()
    }

    /// Sum of all category weights.
    pub fn total_weight(&self) -> f64 {
        self.categories.values().map(GradingCategory::weight).sum()
    }

    /// Resolve a category's members to assignments, in membership order.
    pub fn category_members(&self, category: &GradingCategory) -> Vec<&Assignment> {
        category
            .members()
            .iter()
            .filter_map(|name| self.assignment(name))
            .collect()
    }

    /// Append every assignment labelled `category` that is not yet a member.
    fn rebuild_membership(&mut self, category: &str) {
        let Some(cat) = self.categories.get_mut(category) else {
            return;
        };
        for assignment in &self.assignments {
            if assignment.category() == category {
                cat.add_member(assignment.name());
            }
        }
    }
}

impl fmt::Debug for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Course")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("semester", &self.semester)
            .field("uses_categories", &self.uses_categories)
            .field("roster", &self.roster)
            .field("assignments", &self.assignments)
            .field("categories", &self.categories)
            .field(
                "calculator",
                &self.calculator.as_ref().map(|c| c.name().to_string()),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::{CategoryBased, PointsBased};

    fn course(uses_categories: bool) -> Course {
        Course::new("CS101", "Intro to Programming", "Fall 2026", uses_categories).unwrap()
    }

    fn hw(name: &str) -> Assignment {
        Assignment::new(name, 10.0, "Homework").unwrap().graded(true)
    }

    #[test]
    fn new_validates_names() {
        assert_eq!(
            Course::new("", "Intro", "Fall", false).unwrap_err(),
            GradebookError::EmptyName("course id")
        );
        assert!(Course::new("CS101", "", "Fall", false).is_err());
    }

    #[test]
    fn calculator_follows_initial_flag() {
        assert_eq!(course(false).calculator().unwrap().name(), "points");
        assert_eq!(course(true).calculator().unwrap().name(), "categories");
    }

    #[test]
    fn enrollment_is_idempotent() {
        let mut c = course(false);
        assert!(c.enroll("alice"));
        assert!(!c.enroll("alice"));
        assert_eq!(c.roster(), vec!["alice"]);
        assert!(c.unenroll("alice"));
        assert!(!c.unenroll("alice"));
        assert!(!c.is_enrolled("alice"));
    }

    #[test]
    fn roster_is_a_copy() {
        let mut c = course(false);
        c.enroll("alice");
        let mut roster = c.roster();
        roster.push("mallory".into());
        assert_eq!(c.roster(), vec!["alice"]);
    }

    #[test]
    fn duplicate_assignment_first_write_wins() {
        let mut c = course(false);
        assert!(c.add_assignment(hw("HW1")));
        let mut other = Assignment::new("HW1", 50.0, "Homework").unwrap();
        other.set_graded(true);
        assert!(!c.add_assignment(other));
        assert_eq!(c.assignment("HW1").unwrap().points_possible(), 10.0);
    }

    #[test]
    fn duplicate_category_first_write_wins() {
        let mut c = course(true);
        assert!(c.add_category(GradingCategory::new("Homework", 0.5, 1).unwrap()));
        assert!(!c.add_category(GradingCategory::new("Homework", 0.9, 0).unwrap()));
        assert_eq!(c.category("Homework").unwrap().weight(), 0.5);
    }

    #[test]
    fn membership_by_label_either_order() {
        let mut c = course(true);
        c.add_assignment(hw("HW1"));
        c.add_category(GradingCategory::new("Homework", 0.5, 0).unwrap());
        c.add_assignment(hw("HW2"));
        c.add_assignment(Assignment::new("Q1", 10.0, "Quizzes").unwrap());
        let cat = c.category("Homework").unwrap();
        assert_eq!(cat.members(), ["HW1", "HW2"]);
        let members: Vec<&str> = c.category_members(cat).iter().map(|a| a.name()).collect();
        assert_eq!(members, vec!["HW1", "HW2"]);
    }

    #[test]
    fn remove_assignment_strikes_category_membership() {
        let mut c = course(true);
        c.add_category(GradingCategory::new("Homework", 0.5, 0).unwrap());
        c.add_assignment(hw("HW1"));
        c.add_assignment(hw("HW2"));
        let removed = c.remove_assignment("HW1").unwrap();
        assert_eq!(removed.name(), "HW1");
        assert!(c.assignment("HW1").is_none());
        assert_eq!(c.category("Homework").unwrap().members(), ["HW2"]);
        assert!(c.remove_assignment("HW1").is_none());
    }

    #[test]
    fn rename_keeps_membership() {
        let mut c = course(true);
        c.add_category(GradingCategory::new("Homework", 0.5, 0).unwrap());
        c.add_assignment(hw("HW1"));
        c.add_assignment(hw("HW2"));
        assert!(c.rename_assignment("HW1", "Essay").unwrap());
        assert!(!c.rename_assignment("Essay", "HW2").unwrap());
        assert!(!c.rename_assignment("missing", "HW9").unwrap());
        assert!(c.rename_assignment("HW2", "").is_err());
        assert_eq!(c.category("Homework").unwrap().members(), ["Essay", "HW2"]);
        assert!(c.assignment("Essay").is_some());
    }

    #[test]
    fn recategorize_moves_membership() {
        let mut c = course(true);
        c.add_category(GradingCategory::new("Homework", 0.5, 0).unwrap());
        c.add_category(GradingCategory::new("Quizzes", 0.5, 0).unwrap());
        c.add_assignment(hw("HW1"));
        assert!(c.recategorize_assignment("HW1", "Quizzes"));
        assert!(c.category("Homework").unwrap().members().is_empty());
        assert_eq!(c.category("Quizzes").unwrap().members(), ["HW1"]);
        assert_eq!(c.assignment("HW1").unwrap().category(), "Quizzes");
        assert!(!c.recategorize_assignment("nope", "Quizzes"));
    }

    #[test]
    fn calculator_is_swappable_without_validation() {
        let mut c = course(false);
        c.set_calculator(Some(Arc::new(CategoryBased)));
        assert!(!c.uses_categories());
        assert_eq!(c.calculator().unwrap().name(), "categories");
        c.set_calculator(Some(Arc::new(PointsBased)));
        assert_eq!(c.calculator().unwrap().name(), "points");
    }

    #[test]
    fn no_calculator_averages_zero() {
        let mut c = course(false);
        c.add_assignment(hw("HW1"));
        c.set_calculator(None);
        let learner = Learner::new("alice").unwrap();
        assert_eq!(c.average_for(&learner), 0.0);
        assert!(c.dropped_for(&learner).is_empty());
    }

    #[test]
    fn set_policy_sets_flag_and_calculator() {
        let mut c = course(false);
        c.set_policy(GradingPolicy::Categories);
        assert!(c.uses_categories());
        assert_eq!(c.policy(), GradingPolicy::Categories);
        assert_eq!(c.calculator().unwrap().name(), "categories");
        c.set_uses_categories(false);
        assert_eq!(c.calculator().unwrap().name(), "categories");
    }

    #[test]
    fn total_weight_sums_categories() {
        let mut c = course(true);
        c.add_category(GradingCategory::new("Homework", 0.4, 0).unwrap());
        c.add_category(GradingCategory::new("Exams", 0.6, 0).unwrap());
        assert!((c.total_weight() - 1.0).abs() < 1e-9);
        assert!(c.remove_category("Exams").is_some());
        assert!((c.total_weight() - 0.4).abs() < 1e-9);
    }
}
