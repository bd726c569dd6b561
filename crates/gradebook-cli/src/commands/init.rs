//! The `gradebook init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("gradebook.toml").exists() {
        println!("gradebook.toml already exists, skipping.");
    } else {
        std::fs::write("gradebook.toml", SAMPLE_CONFIG)?;
        println!("Created gradebook.toml");
    }

    std::fs::create_dir_all("gradebooks")?;
    let example_path = std::path::Path::new("gradebooks/example.toml");
    if example_path.exists() {
        println!("gradebooks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_GRADEBOOK)?;
        println!("Created gradebooks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: gradebook validate --gradebook gradebooks/example.toml");
    println!("  2. Run: gradebook report --gradebook gradebooks/example.toml");
    println!("  3. Run: gradebook finalize --gradebook gradebooks/example.toml --course CS101");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gradebook configuration

output_dir = "./gradebook-reports"
default_format = "text"
decimal_places = 2
change_threshold = 0.5
"#;

const EXAMPLE_GRADEBOOK: &str = r#"[[courses]]
id = "CS101"
name = "Intro to Programming"
semester = "Fall 2026"
uses_categories = true
roster = ["alice", "bob"]

[[courses.categories]]
name = "Homework"
weight = 0.5
drop_lowest = 1

[[courses.categories]]
name = "Quizzes"
weight = 0.5

[[courses.assignments]]
name = "HW1"
points_possible = 10
category = "Homework"
graded = true

[[courses.assignments]]
name = "HW2"
points_possible = 10
category = "Homework"
graded = true

[[courses.assignments]]
name = "HW3"
points_possible = 10
category = "Homework"
graded = true

[[courses.assignments]]
name = "Quiz1"
points_possible = 20
category = "Quizzes"
graded = true

[[courses.grades]]
learner = "alice"
assignment = "HW1"
points = 8

[[courses.grades]]
learner = "alice"
assignment = "HW2"
points = 6

[[courses.grades]]
learner = "alice"
assignment = "HW3"
points = 9

[[courses.grades]]
learner = "alice"
assignment = "Quiz1"
points = 17

[[courses.grades]]
learner = "bob"
assignment = "HW1"
points = 10

[[courses.grades]]
learner = "bob"
assignment = "HW2"
points = 7

[[courses.grades]]
learner = "bob"
assignment = "HW3"
points = 9

[[courses.grades]]
learner = "bob"
assignment = "Quiz1"
points = 12
"#;
