use anyhow::{Context, Result};

use hanzi_review_lib::review::{estimate_recall_probability, now_ms};

use crate::app::App;
use crate::render::terminal::{format_next_review, paint, percent, Color};
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let items = app.storage.list_items().context("Failed to list items")?;
    let now = now_ms();

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = items
                .iter()
                .map(|item| {
                    serde_json::json!({
                        "item": item,
                        "recall": estimate_recall_probability(item, now),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if items.is_empty() {
                println!("No items yet. Add one with `hanzi-review add <character>`.");
                return Ok(());
            }

            println!(
                "{:<8} {:<6} {:>5} {:>9} {:>9} {:>6}  Next",
                "Id", "Char", "Reps", "Stability", "Interval", "Recall"
            );
            for item in &items {
                let id = item.id.to_string();
                println!(
                    "{:<8} {:<6} {:>5} {:>8.1}d {:>8}d {:>6}  {}",
                    paint(&id[..8], Color::DIM, use_color),
                    item.label(),
                    item.repetitions,
                    item.stability_days,
                    item.interval_days,
                    percent(estimate_recall_probability(item, now)),
                    format_next_review(item, now)
                );
            }

            println!("\n{} items total", items.len());
        }
    }

    Ok(())
}
