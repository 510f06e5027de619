use anyhow::{Context, Result};

use hanzi_review_lib::review::{format_interval, now_ms, preview_intervals};
use hanzi_review_lib::Grade;

use crate::app::App;
use crate::render::terminal::{format_timestamp, grade_color, paint};
use crate::OutputFormat;

pub fn run(
    app: &App,
    item: &str,
    grade: Grade,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let item = app.find_item(item)?;
    let updated = app
        .storage
        .submit_review(item.id, grade, now_ms())
        .with_context(|| format!("Failed to review {}", item.id))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&updated)?),
        OutputFormat::Plain => {
            println!(
                "{} graded {}: next review in {} ({})",
                updated.label(),
                paint(grade.as_str(), grade_color(grade), use_color),
                format_interval(updated.interval_days),
                updated
                    .next_review_at
                    .map(format_timestamp)
                    .unwrap_or_default()
            );
        }
    }

    Ok(())
}

pub fn run_preview(app: &App, item: &str, format: &OutputFormat) -> Result<()> {
    let item = app.find_item(item)?;
    let intervals = preview_intervals(&item);

    match format {
        OutputFormat::Json => {
            let output: serde_json::Map<String, serde_json::Value> = Grade::ALL
                .iter()
                .zip(intervals)
                .map(|(grade, days)| (grade.to_string(), days.into()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let labels: Vec<String> = Grade::ALL
                .iter()
                .zip(intervals)
                .map(|(grade, days)| format!("{} {}", grade, format_interval(days)))
                .collect();
            println!("{}: {}", item.label(), labels.join(" | "));
        }
    }

    Ok(())
}
