use anyhow::{Context, Result};

use hanzi_review_lib::review::now_ms;

use crate::app::App;
use crate::render::terminal::percent;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let stats = app
        .storage
        .review_stats(now_ms())
        .context("Failed to compute statistics")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Plain => {
            println!("Data:        {}", app.data_dir.display());
            println!("Items:       {}", stats.total_items);
            println!("  new:       {}", stats.new_items);
            println!("  learning:  {}", stats.learning_items);
            println!("  mature:    {}", stats.mature_items);
            println!("Due now:     {}", stats.due_items);
            println!("Fill tests:  {}", stats.with_fill_test);
            if let Some(mean) = stats.mean_recall {
                println!("Mean recall: {}", percent(mean).trim_start());
            }
        }
    }

    Ok(())
}
