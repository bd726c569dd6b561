//! The `gradebook validate` command.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::parser;

pub fn execute(gradebook_path: PathBuf) -> Result<()> {
    let book = parser::parse_gradebook(&gradebook_path)?;

    println!(
        "Gradebook: {} ({} courses, {} learners)",
        gradebook_path.display(),
        book.courses().count(),
        book.learners().count()
    );
    for course in book.courses() {
        println!(
            "  {}: {} assignments, {} enrolled [{}]",
            course.id(),
            course.assignments().len(),
            course.roster().len(),
            course.policy()
        );
    }

    let warnings = parser::validate_gradebook(&book);
    for w in &warnings {
        let prefix = w
            .course_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("All gradebooks valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
