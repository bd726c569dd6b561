//! The `gradebook gpa` command.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::learner::Learner;
use gradebook_core::parser;

pub fn execute(gradebook_path: PathBuf, learner: Option<String>) -> Result<()> {
    let book = parser::parse_gradebook(&gradebook_path)?;

    let learners: Vec<&Learner> = match &learner {
        Some(username) => match book.learner(username) {
            Some(l) => vec![l],
            None => anyhow::bail!(
                "learner '{username}' not found in {}",
                gradebook_path.display()
            ),
        },
        None => book.learners().collect(),
    };

    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Learner", "Completed", "Letters", "GPA"]);

    for l in learners {
        let letters: Vec<String> = l
            .final_letters()
            .iter()
            .map(|(course, letter)| format!("{course}:{letter}"))
            .collect();
        table.add_row(vec![
            Cell::new(l.username()),
            Cell::new(l.completed_courses().len()),
            Cell::new(letters.join(" ")),
            Cell::new(format!("{:.2}", l.calculate_gpa())),
        ]);
    }

    println!("{table}");

    Ok(())
}
