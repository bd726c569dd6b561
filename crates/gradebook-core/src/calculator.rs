//! Grade calculators: flat points and weighted categories.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::category::GradingCategory;
use crate::course::Course;
use crate::learner::Learner;
use crate::model::{Assignment, GradeRecord};
use crate::traits::GradeCalculator;

/// Which calculator a course uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradingPolicy {
    Points,
    Categories,
}

impl GradingPolicy {
    /// The policy selected by a course's category toggle.
    pub fn from_flag(uses_categories: bool) -> Self {
        if uses_categories {
            GradingPolicy::Categories
        } else {
            GradingPolicy::Points
        }
    }

    pub fn uses_categories(self) -> bool {
        self == GradingPolicy::Categories
    }

    /// A calculator implementing this policy.
    pub fn calculator(self) -> Arc<dyn GradeCalculator> {
        match self {
            GradingPolicy::Points => Arc::new(PointsBased),
            GradingPolicy::Categories => Arc::new(CategoryBased),
        }
    }
}

impl fmt::Display for GradingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradingPolicy::Points => write!(f, "points"),
            GradingPolicy::Categories => write!(f, "categories"),
        }
    }
}

impl FromStr for GradingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "points" | "flat" => Ok(GradingPolicy::Points),
            "categories" | "weighted" => Ok(GradingPolicy::Categories),
            other => Err(format!("unknown grading policy: {other}")),
        }
    }
}

/// Sum (earned, possible) over `assignments`. A missing score earns 0.
fn totals<'a>(
    assignments: impl IntoIterator<Item = &'a Assignment>,
    scores: Option<&BTreeMap<String, GradeRecord>>,
) -> (f64, f64) {
    assignments
        .into_iter()
        .fold((0.0, 0.0), |(earned, possible), a| {
            let got = scores
                .and_then(|s| s.get(a.name()))
                .map(GradeRecord::points_earned)
                .unwrap_or(0.0);
            (earned + got, possible + a.points_possible())
        })
}

fn percentage(earned: f64, possible: f64) -> Option<f64> {
    if possible == 0.0 {
        None
    } else {
        Some(earned / possible * 100.0)
    }
}

// ---------------------------------------------------------------------------
// Points-based
// ---------------------------------------------------------------------------

/// Total points earned over total points possible across every graded
/// assignment in the course.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointsBased;

impl GradeCalculator for PointsBased {
    fn name(&self) -> &str {
        "points"
    }

    fn final_average(&self, course: &Course, learner: &Learner) -> f64 {
        let scores = learner.course_grades(course.id());
        let graded = course.assignments().iter().filter(|a| a.is_graded());
        let (earned, possible) = totals(graded, scores);
        percentage(earned, possible).unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Category-based
// ---------------------------------------------------------------------------

/// How one category fed into a learner's weighted average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: String,
    pub weight: f64,
    /// `None` when the category had no eligible points and was skipped.
    pub percentage: Option<f64>,
    /// `percentage * weight`, or 0 when skipped.
    pub contribution: f64,
    pub dropped: Vec<String>,
}

/// Weighted sum of per-category percentages, after dropping each category's
/// lowest scores.
///
/// A category with no eligible points is skipped and its weight is not handed
/// to the others, so such a learner's total cannot reach 100.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryBased;

impl CategoryBased {
    /// Per-category results for a learner, in category-name order.
    ///
    /// Empty when the course does not use categories.
    pub fn breakdown(&self, course: &Course, learner: &Learner) -> Vec<CategoryResult> {
        if !course.uses_categories() {
            return Vec::new();
        }
        let scores = learner.course_grades(course.id());
        course
            .categories()
            .map(|category| evaluate(course, category, scores))
            .collect()
    }
}

fn evaluate(
    course: &Course,
    category: &GradingCategory,
    scores: Option<&BTreeMap<String, GradeRecord>>,
) -> CategoryResult {
    let members = course.category_members(category);
    let dropped: Vec<String> = category
        .dropped(&members, scores)
        .into_iter()
        .map(|a| a.name().to_string())
        .collect();
    let excluded: HashSet<&str> = dropped.iter().map(String::as_str).collect();

    let eligible = members
        .iter()
        .copied()
        .filter(|a| a.is_graded() && !excluded.contains(a.name()));
    let (earned, possible) = totals(eligible, scores);
    let pct = percentage(earned, possible);
    if pct.is_none() {
        tracing::debug!(
            "category '{}' in {} has no eligible points, skipping",
            category.name(),
            course.id()
        );
    }

    CategoryResult {
        category: category.name().to_string(),
        weight: category.weight(),
        percentage: pct,
        contribution: pct.map(|p| p * category.weight()).unwrap_or(0.0),
        dropped,
    }
}

impl GradeCalculator for CategoryBased {
    fn name(&self) -> &str {
        "categories"
    }

    fn final_average(&self, course: &Course, learner: &Learner) -> f64 {
        if !course.uses_categories() {
            tracing::debug!(
                "course {} does not use categories, category average is 0",
                course.id()
            );
            return 0.0;
        }
        self.breakdown(course, learner)
            .iter()
            .map(|r| r.contribution)
            .sum()
    }

    fn dropped(&self, course: &Course, learner: &Learner) -> Vec<String> {
        self.breakdown(course, learner)
            .into_iter()
            .flat_map(|r| r.dropped)
            .collect()
    }
}
