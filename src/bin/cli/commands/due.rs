use anyhow::{Context, Result};

use hanzi_review_lib::review::{estimate_recall_probability, now_ms, rank_by_recall};

use crate::app::App;
use crate::render::terminal::{paint, percent, Color};
use crate::OutputFormat;

pub fn run(
    app: &App,
    limit: Option<usize>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let now = now_ms();
    let mut items = app.storage.due_items(now).context("Failed to load due items")?;
    let total_due = items.len();

    if app.config.sort_due_by_recall {
        rank_by_recall(&mut items, now);
    }
    items.truncate(limit.unwrap_or(app.config.due_limit));

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "totalDue": total_due,
                "items": items,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if total_due == 0 {
                println!("Nothing due. 加油!");
                return Ok(());
            }

            for item in &items {
                let id = item.id.to_string();
                let test = if item.fill_test.is_some() { " [fill test]" } else { "" };
                println!(
                    "{}  {}  recall {}{}",
                    paint(&id[..8], Color::DIM, use_color),
                    paint(item.label(), Color::BOLD, use_color),
                    percent(estimate_recall_probability(item, now)),
                    test
                );
            }

            if total_due > items.len() {
                println!("\n{} of {} due items shown", items.len(), total_due);
            } else {
                println!("\n{} items due", total_due);
            }
        }
    }

    Ok(())
}
