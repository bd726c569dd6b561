//! The `gradebook scale` command.

use anyhow::Result;

use gradebook_core::scale::{GradeScale, LetterGrade};

pub fn execute(percentage: Option<f64>, letter: Option<String>) -> Result<()> {
    if let Some(p) = percentage {
        anyhow::ensure!(p.is_finite(), "percentage must be a finite number");
        let letter = GradeScale::from_percentage(p);
        println!("{p} -> {letter} ({:.1} GPA points)", letter.gpa_points());
    }

    if let Some(l) = &letter {
        let parsed = l.parse::<LetterGrade>().map_err(anyhow::Error::msg)?;
        println!(
            "{parsed} -> {:.1} GPA points (from {}%)",
            parsed.gpa_points(),
            parsed.min_percentage()
        );
    }

    if percentage.is_none() && letter.is_none() {
        use comfy_table::{Cell, Table};

        let mut table = Table::new();
        table.set_header(vec!["Letter", "Minimum %", "GPA Points"]);
        for tier in GradeScale::tiers() {
            table.add_row(vec![
                Cell::new(tier.letter),
                Cell::new(format!("{}", tier.min_percentage)),
                Cell::new(format!("{:.1}", tier.gpa_points)),
            ]);
        }
        println!("{table}");
    }

    Ok(())
}
