mod app;
mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};
use hanzi_review_lib::Grade;

#[derive(Parser)]
#[command(
    name = "hanzi-review",
    about = "Spaced-repetition review for Chinese characters",
    version
)]
struct Cli {
    /// Data directory (default: $HANZI_REVIEW_DATA_DIR, then the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Add a character to review
    Add {
        /// The character (or word) to learn
        character: String,
    },

    /// List all items with their schedule
    List,

    /// List items due for review now
    Due {
        /// Maximum items to show (default from config)
        #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
        limit: Option<usize>,
    },

    /// Grade a flashcard review
    Review {
        /// Item id (any unique prefix)
        item: String,
        /// again, hard, good or easy
        grade: Grade,
    },

    /// Show the interval each grade would give
    Preview {
        /// Item id (any unique prefix)
        item: String,
    },

    /// Fill-in-the-blank tests
    #[command(subcommand)]
    FillTest(FillTestCommand),

    /// Show review statistics
    Stats,

    /// Delete an item
    Delete {
        /// Item id (any unique prefix)
        item: String,
    },
}

#[derive(Subcommand)]
enum FillTestCommand {
    /// Attach a fill test to an item
    Set {
        /// Item id (any unique prefix)
        item: String,
        /// Candidate phrase; give exactly three
        #[arg(long = "phrase", required = true)]
        phrases: Vec<String>,
        /// Sentence as ANSWER:TEXT, e.g. "1:我每天早上___。"; give exactly three
        #[arg(long = "sentence", required = true)]
        sentences: Vec<String>,
    },

    /// Show an item's fill test
    Show {
        /// Item id (any unique prefix)
        item: String,
    },

    /// Grade placements given as SENTENCE:PHRASE, e.g. 0:1 1:0 2:2
    Submit {
        /// Item id (any unique prefix)
        item: String,
        placements: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    let app = app::App::new(cli.data_dir.as_deref())?;

    match cli.command {
        Command::Add { character } => {
            commands::add::run(&app, &character, &cli.format, use_color)?;
        }
        Command::List => {
            commands::list::run(&app, &cli.format, use_color)?;
        }
        Command::Due { limit } => {
            commands::due::run(&app, limit, &cli.format, use_color)?;
        }
        Command::Review { item, grade } => {
            commands::review::run(&app, &item, grade, &cli.format, use_color)?;
        }
        Command::Preview { item } => {
            commands::review::run_preview(&app, &item, &cli.format)?;
        }
        Command::FillTest(subcmd) => match subcmd {
            FillTestCommand::Set {
                item,
                phrases,
                sentences,
            } => {
                commands::fill_test::run_set(&app, &item, &phrases, &sentences, &cli.format)?;
            }
            FillTestCommand::Show { item } => {
                commands::fill_test::run_show(&app, &item, &cli.format)?;
            }
            FillTestCommand::Submit { item, placements } => {
                commands::fill_test::run_submit(&app, &item, &placements, &cli.format, use_color)?;
            }
        },
        Command::Stats => {
            commands::stats::run(&app, &cli.format)?;
        }
        Command::Delete { item } => {
            let item = app.find_item(&item)?;
            app.storage.delete_item(item.id)?;
            println!("Deleted {} ({})", item.label(), item.id);
        }
    }

    Ok(())
}
