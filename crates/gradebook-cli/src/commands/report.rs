//! The `gradebook report` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use gradebook_core::config::{load_config_from, OutputFormat};
use gradebook_core::parser;
use gradebook_core::report::CourseReport;

pub fn execute(
    gradebook_path: PathBuf,
    course: Option<String>,
    format: Option<String>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let format = match format {
        Some(f) => f.parse::<OutputFormat>().map_err(anyhow::Error::msg)?,
        None => config.default_format,
    };
    let output = output.unwrap_or_else(|| config.output_dir.clone());
    let decimals = config.decimal_places;

    let book = parser::parse_gradebook(&gradebook_path)?;

    let course_ids: Vec<String> = match course {
        Some(id) => {
            anyhow::ensure!(
                book.course(&id).is_some(),
                "course '{id}' not found in {}",
                gradebook_path.display()
            );
            vec![id]
        }
        None => book.courses().map(|c| c.id().to_string()).collect(),
    };

    if course_ids.is_empty() {
        println!("No courses in {}.", gradebook_path.display());
        return Ok(());
    }

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    for id in &course_ids {
        let report = CourseReport::build(&book, id)
            .with_context(|| format!("course '{id}' disappeared while reporting"))?;

        match format {
            OutputFormat::Text => print_summary(&report, decimals),
            OutputFormat::Markdown => println!("{}", report.to_markdown(decimals)),
            OutputFormat::Json => {
                let path = output.join(format!("report-{id}-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Report saved to: {}", path.display());
            }
        }
    }

    Ok(())
}

fn print_summary(report: &CourseReport, decimals: usize) {
    use comfy_table::{Cell, Table};

    println!(
        "Course: {} ({}, {}) [{} policy]",
        report.course.id, report.course.name, report.course.semester, report.course.policy
    );

    let mut table = Table::new();
    table.set_header(vec!["Learner", "Percentage", "Letter", "Final", "Dropped"]);

    for s in &report.standings {
        table.add_row(vec![
            Cell::new(&s.username),
            Cell::new(format!("{:.*}%", decimals, s.percentage)),
            Cell::new(s.letter),
            Cell::new(s.final_letter.map(|l| l.to_string()).unwrap_or_default()),
            Cell::new(s.dropped.join(", ")),
        ]);
    }

    println!("{table}");

    let stats = &report.statistics;
    if stats.learner_count == 0 {
        println!("No enrolled learners.\n");
        return;
    }
    let distribution: Vec<String> = stats
        .letter_distribution
        .iter()
        .map(|(letter, count)| format!("{letter}={count}"))
        .collect();
    println!(
        "Learners: {} | Mean: {:.*}% | Median: {:.*}% | Min: {:.*}% | Max: {:.*}% | {}\n",
        stats.learner_count,
        decimals,
        stats.mean,
        decimals,
        stats.median,
        decimals,
        stats.min,
        decimals,
        stats.max,
        distribution.join(" ")
    );
}
