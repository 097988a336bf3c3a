use serde::Serialize;
use slotboard_core::codec::decode_with_layout;
use slotboard_core::Board;
use slotboard_slack::blocks::unescape_text;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct InspectReport<'a> {
    layout: &'static str,
    slot_count: usize,
    free_places: usize,
    board: &'a Board,
}

/// Decodes a board message text. `escaped` input is Slack message text and is unescaped first.
pub fn run(input: &str, escaped: bool) -> CommandResult {
    let unescaped;
    let text = if escaped {
        unescaped = unescape_text(input);
        unescaped.as_str()
    } else {
        input
    };
    // Shell pipes usually add a final newline that is not part of the message.
    let text = text.strip_suffix('\n').unwrap_or(text);

    let (board, layout) = match decode_with_layout(text) {
        Ok(decoded) => decoded,
        Err(failure) => {
            return CommandResult::failure("inspect", "parse_failure", failure.to_string(), 2)
        }
    };

    let report = InspectReport {
        layout,
        slot_count: board.slot_count(),
        free_places: board.slots().iter().map(|slot| slot.free_places()).sum(),
        board: &board,
    };

    match serde_json::to_string_pretty(&report) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure("inspect", "serialization", error.to_string(), 1),
    }
}
