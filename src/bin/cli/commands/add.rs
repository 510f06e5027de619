use anyhow::{bail, Context, Result};

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub fn run(app: &App, character: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let character = character.trim();
    if character.is_empty() {
        bail!("Character must not be empty");
    }

    let item = app
        .storage
        .create_item(Some(character.to_string()))
        .context("Failed to create item")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&item)?),
        OutputFormat::Plain => {
            println!(
                "Added {} {}",
                paint(item.label(), Color::BOLD, use_color),
                paint(&item.id.to_string(), Color::DIM, use_color)
            );
        }
    }

    Ok(())
}
