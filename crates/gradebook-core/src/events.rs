//! Change events emitted by [`crate::gradebook::Gradebook`] mutations.

use std::fmt;

use serde::Serialize;

/// What changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Enrolled,
    Unenrolled,
    AssignmentAdded,
    AssignmentRemoved,
    AssignmentRenamed,
    GradeAdded,
    GradeRemoved,
    CourseCompleted,
    FinalGradeAssigned,
}

impl ChangeKind {
    /// The event's string tag.
    pub fn tag(self) -> &'static str {
        match self {
            ChangeKind::Enrolled => "enrolled",
            ChangeKind::Unenrolled => "unenrolled",
            ChangeKind::AssignmentAdded => "assignment_added",
            ChangeKind::AssignmentRemoved => "assignment_removed",
            ChangeKind::AssignmentRenamed => "assignment_renamed",
            ChangeKind::GradeAdded => "grade_added",
            ChangeKind::GradeRemoved => "grade_removed",
            ChangeKind::CourseCompleted => "course_completed",
            ChangeKind::FinalGradeAssigned => "final_grade_assigned",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A single change notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    /// The entity the change is about, e.g. "CS101" or "CS101/alice".
    pub subject: String,
    pub old: Option<String>,
    pub new: Option<String>,
}

impl ChangeEvent {
    pub fn new(
        kind: ChangeKind,
        subject: impl Into<String>,
        old: Option<String>,
        new: Option<String>,
    ) -> Self {
        Self {
            kind,
            subject: subject.into(),
            old,
            new,
        }
    }

    pub fn tag(&self) -> &'static str {
        self.kind.tag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_serialized_names() {
        for kind in [
            ChangeKind::Enrolled,
            ChangeKind::AssignmentRemoved,
            ChangeKind::FinalGradeAssigned,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.tag()));
        }
    }

    #[test]
    fn event_carries_old_and_new() {
        let event = ChangeEvent::new(
            ChangeKind::GradeAdded,
            "CS101/alice",
            Some("6".into()),
            Some("8".into()),
        );
        assert_eq!(event.tag(), "grade_added");
        assert_eq!(event.old.as_deref(), Some("6"));
        assert_eq!(event.new.as_deref(), Some("8"));
    }
}
