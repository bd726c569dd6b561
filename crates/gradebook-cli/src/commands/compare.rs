//! The `gradebook compare` command.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::config::load_config;
use gradebook_core::report::CourseReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: Option<f64>,
    fail_on_decline: bool,
    format: String,
) -> Result<()> {
    let threshold = match threshold {
        Some(t) => t,
        None => load_config()?.change_threshold,
    };
    anyhow::ensure!(
        threshold.is_finite() && threshold >= 0.0,
        "threshold must be a non-negative number"
    );

    let baseline = CourseReport::load_json(&baseline_path)?;
    let current = CourseReport::load_json(&current_path)?;

    if baseline.course.id != current.course.id {
        tracing::warn!(
            "comparing reports for different courses: {} vs {}",
            baseline.course.id,
            current.course.id
        );
    }

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            // text format
            println!(
                "Comparison: {} declines, {} improvements, {} unchanged",
                report.declines.len(),
                report.improvements.len(),
                report.unchanged
            );

            if !report.declines.is_empty() {
                println!("\nDeclines:");
                for d in &report.declines {
                    println!(
                        "  {} {:.1}% ({}) -> {:.1}% ({}) ({:+.1})",
                        d.username,
                        d.baseline_percentage,
                        d.baseline_letter,
                        d.current_percentage,
                        d.current_letter,
                        d.delta
                    );
                }
            }

            if !report.improvements.is_empty() {
                println!("\nImprovements:");
                for i in &report.improvements {
                    println!(
                        "  {} {:.1}% ({}) -> {:.1}% ({}) ({:+.1})",
                        i.username,
                        i.baseline_percentage,
                        i.baseline_letter,
                        i.current_percentage,
                        i.current_letter,
                        i.delta
                    );
                }
            }

            if report.new_learners > 0 {
                println!("\n{} new learner(s)", report.new_learners);
            }
            if report.removed_learners > 0 {
                println!("{} removed learner(s)", report.removed_learners);
            }
        }
    }

    if fail_on_decline && report.has_declines() {
        std::process::exit(1);
    }

    Ok(())
}
