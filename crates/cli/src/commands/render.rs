use slotboard_core::config::{AppConfig, LimitsConfig, LoadOptions};
use slotboard_core::engine::create;
use slotboard_core::locale::Locale;
use slotboard_slack::blocks::board_message;
use slotboard_slack::commands::parse_select;

use super::CommandResult;

#[derive(Debug, Clone, Default)]
pub struct RenderArgs {
    /// `<count>[x<capacity>]`
    pub shape: String,
    pub caption: Option<String>,
    pub info: Vec<String>,
    pub locale: Option<Locale>,
    pub blocks: bool,
}

/// Prints the text of a fresh board, or its Block Kit payload with `blocks`.
pub fn run(args: RenderArgs) -> CommandResult {
    run_with_limits(args, configured_limits())
}

pub fn run_with_limits(args: RenderArgs, limits: LimitsConfig) -> CommandResult {
    let mut command_text = args.shape.trim().to_string();
    if let Some(caption) = args.caption.as_deref() {
        command_text.push(' ');
        command_text.push_str(caption);
    }

    let mut request = match parse_select(&command_text) {
        Ok(request) => request,
        Err(error) => {
            return CommandResult::failure("render", "invalid_arguments", error.to_string(), 2)
        }
    };
    // `--info` lines never become the caption, even when no caption was given.
    let info_lines = request
        .info
        .iter()
        .flat_map(|info| info.lines())
        .chain(args.info.iter().flat_map(|info| info.lines()))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    request.info = (!info_lines.is_empty()).then_some(info_lines);
    if let Err(error) = request.validate(&limits) {
        return CommandResult::failure("render", "limits", error.to_string(), 2);
    }

    let board = create(request.caption, request.info, request.count, request.capacity);
    if !args.blocks {
        return CommandResult { exit_code: 0, output: slotboard_core::codec::encode(&board) };
    }

    let message = board_message(&board, args.locale.unwrap_or_default());
    match serde_json::to_string_pretty(&message) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure("render", "serialization", error.to_string(), 1),
    }
}

/// Limits from the loaded config; defaults when no valid config is available.
fn configured_limits() -> LimitsConfig {
    AppConfig::load(LoadOptions::default()).map(|config| config.limits).unwrap_or_default()
}
