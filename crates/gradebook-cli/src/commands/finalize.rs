//! The `gradebook finalize` command.
//!
//! Completes a course for every enrolled learner on an in-memory copy of the
//! gradebook and prints the stored letters. The gradebook file is not
//! rewritten.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::parser;

pub fn execute(gradebook_path: PathBuf, course_id: String) -> Result<()> {
    let mut book = parser::parse_gradebook(&gradebook_path)?;

    let Some(course) = book.course(&course_id) else {
        anyhow::bail!(
            "course '{course_id}' not found in {}",
            gradebook_path.display()
        );
    };
    let name = course.name().to_string();

    let averages: Vec<(String, f64)> = book
        .enrolled_learners(&course_id)
        .iter()
        .map(|l| (l.username().to_string(), book.final_average(&course_id, l.username())))
        .collect();

    let letters = book.complete_course_for_all(&course_id);
    tracing::debug!("finalized {course_id} for {} learner(s)", letters.len());

    if letters.is_empty() {
        println!("No learners currently taking {course_id}.");
        return Ok(());
    }

    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Learner", "Percentage", "Letter", "GPA Points", "GPA"]);

    for (username, percentage) in &averages {
        let Some(letter) = letters.get(username) else {
            continue;
        };
        table.add_row(vec![
            Cell::new(username),
            Cell::new(format!("{percentage:.2}%")),
            Cell::new(letter),
            Cell::new(format!("{:.1}", letter.gpa_points())),
            Cell::new(format!("{:.2}", book.gpa(username))),
        ]);
    }

    println!("Finalized {course_id} ({name}) for {} learner(s)", letters.len());
    println!("{table}");

    Ok(())
}
