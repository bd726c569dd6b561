//! Core trait definitions for grading policies and change observers.
//!
//! Calculators are implemented in [`crate::calculator`]; observers are
//! supplied by whatever presents the gradebook.

use crate::course::Course;
use crate::events::ChangeEvent;
use crate::learner::Learner;

// ---------------------------------------------------------------------------
// Grade calculator trait
// ---------------------------------------------------------------------------

/// A grading policy: turns a learner's scores in a course into a percentage.
///
/// Implementations are stateless and may be shared between courses.
pub trait GradeCalculator: Send + Sync {
    /// Short policy name (e.g. "points").
    fn name(&self) -> &str;

    /// The learner's course percentage, or `0.0` when there is nothing to
    /// average.
    fn final_average(&self, course: &Course, learner: &Learner) -> f64;

    /// Names of the assignments this policy excludes for the learner.
    fn dropped(&self, _course: &Course, _learner: &Learner) -> Vec<String> {
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// Change observer trait
// ---------------------------------------------------------------------------

/// Receives structural change notifications from a gradebook.
pub trait ChangeObserver: Send + Sync {
    fn on_change(&self, event: &ChangeEvent);
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl ChangeObserver for NoopObserver {
    fn on_change(&self, _: &ChangeEvent) {}
}
