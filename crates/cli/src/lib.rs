pub mod commands;

use std::io::{self, Read};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use slotboard_core::locale::Locale;

#[derive(Debug, Parser)]
#[command(
    name = "slotboard",
    about = "Slotboard operator CLI",
    long_about = "Inspect configuration, check readiness, and render or decode board messages offline.",
    after_help = "Examples:\n  slotboard doctor --json\n  slotboard render 4x2 \"Friday lunch\" --info \"Room 4\"\n  pbpaste | slotboard inspect"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, Slack token readiness, and board limits")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Print the message text of a fresh board")]
    Render {
        #[arg(help = "Board shape: <count>[x<places>]")]
        shape: String,
        #[arg(help = "Caption line")]
        caption: Option<String>,
        #[arg(long, help = "Description line; repeat for several lines")]
        info: Vec<String>,
        #[arg(long, help = "Locale for button labels (en, uk, ru)")]
        locale: Option<Locale>,
        #[arg(long, help = "Emit the Block Kit payload instead of plain text")]
        blocks: bool,
    },
    #[command(about = "Decode board message text read from stdin")]
    Inspect {
        #[arg(long, help = "Input is Slack-escaped message text (&amp; &lt; &gt;)")]
        escaped: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Render { shape, caption, info, locale, blocks } => {
            commands::render::run(commands::render::RenderArgs {
                shape,
                caption,
                info,
                locale,
                blocks,
            })
        }
        Command::Inspect { escaped } => {
            let mut input = String::new();
            match io::stdin().read_to_string(&mut input) {
                Ok(_) => commands::inspect::run(&input, escaped),
                Err(error) => commands::CommandResult::failure(
                    "inspect",
                    "stdin",
                    format!("could not read stdin: {error}"),
                    1,
                ),
            }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
