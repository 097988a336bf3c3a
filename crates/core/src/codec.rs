//! Text codec for boards.
//!
//! The message text is the only place a board is stored, so every interaction decodes the text it
//! was handed, applies one transition, and encodes the result again. Encoding always produces the
//! extended layout (or the compact one when there is no info block):
//!
//! ```text
//! <caption>
//! ----------------------------------------
//! <info>
//! ----------------------------------------
//! 1 - @amy (Amy Pond), —
//! 2 - John, —
//! ```
//!
//! Decoding tries each layout in [`LAYOUTS`] in order, newest first, so messages written by older
//! versions (10-dash separator, `вільно` free places) keep working.

use crate::board::{Board, Identity, Slot};
use crate::errors::ParseFailure;

pub const SEPARATOR: &str = "----------------------------------------";
pub const LEGACY_SEPARATOR: &str = "----------";
pub const FREE_MARKER: &str = "—";
pub const LEGACY_FREE_MARKERS: &[&str] = &["вільно"];

const FIRST_SLOT_PREFIX: &str = "1 - ";
const SLOT_INDEX_DELIMITER: &str = " - ";
const PLACE_DELIMITER: char = ',';

pub fn is_free_marker(text: &str) -> bool {
    text == FREE_MARKER || LEGACY_FREE_MARKERS.contains(&text)
}

pub fn is_separator_line(line: &str) -> bool {
    line == SEPARATOR || line == LEGACY_SEPARATOR
}

pub fn encode(board: &Board) -> String {
    let mut lines = Vec::with_capacity(board.slot_count() + 4);

    if let Some(caption) = &board.caption {
        lines.push(caption.clone());
    }
    lines.push(SEPARATOR.to_owned());
    if let Some(info) = &board.info {
        lines.push(info.clone());
        lines.push(SEPARATOR.to_owned());
    }
    for (index, slot) in board.slots().iter().enumerate() {
        lines.push(format!("{}{SLOT_INDEX_DELIMITER}{}", index + 1, render_places(slot)));
    }

    lines.join("\n")
}

pub fn decode(text: &str) -> Result<Board, ParseFailure> {
    decode_with_layout(text).map(|(board, _)| board)
}

/// Decodes the text and reports the name of the layout that recognised it.
pub fn decode_with_layout(text: &str) -> Result<(Board, &'static str), ParseFailure> {
    let lines = text.split('\n').collect::<Vec<_>>();

    let (layout_name, layout) = LAYOUTS
        .iter()
        .find_map(|matcher| matcher.split(&lines).map(|layout| (matcher.name(), layout)))
        .ok_or(ParseFailure::UnrecognizedLayout)?;

    let slots = layout
        .slot_lines
        .iter()
        .enumerate()
        .map(|(index, line)| parse_slot_line(index, line))
        .collect::<Result<Vec<_>, _>>()?;

    Ok((Board::new(layout.caption, layout.info, slots), layout_name))
}

pub fn identity_text(identity: &Identity) -> String {
    match (identity.handle(), identity.display_name()) {
        (Some(handle), Some(display_name)) => format!("{handle} ({display_name})"),
        (Some(handle), None) => handle.to_owned(),
        (None, Some(display_name)) => display_name.to_owned(),
        (None, None) => FREE_MARKER.to_owned(),
    }
}

/// Decodes one trimmed place. `None` means the piece was empty and is not a place at all.
pub fn parse_place(piece: &str) -> Option<Option<Identity>> {
    let piece = piece.trim();
    if piece.is_empty() {
        return None;
    }
    if is_free_marker(piece) {
        return Some(None);
    }

    Some(Some(parse_handle_form(piece).unwrap_or_else(|| Identity::with_display_name(piece))))
}

fn parse_handle_form(piece: &str) -> Option<Identity> {
    if !piece.starts_with('@') {
        return None;
    }

    let (handle, rest) = match piece.find(char::is_whitespace) {
        Some(at) => (&piece[..at], piece[at..].trim_start()),
        None => (piece, ""),
    };
    if handle.len() < 2 {
        return None;
    }
    if rest.is_empty() {
        return Some(Identity::with_handle(handle));
    }

    let display_name = rest.strip_prefix('(')?.strip_suffix(')')?;
    Identity::new(Some(handle.to_owned()), Some(display_name.to_owned()))
}

fn render_places(slot: &Slot) -> String {
    slot.places()
        .iter()
        .map(|place| match place {
            Some(identity) => identity_text(identity),
            None => FREE_MARKER.to_owned(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_slot_line(index: usize, line: &str) -> Result<Slot, ParseFailure> {
    let line_number = index + 1;
    let digits_end = line.find(|ch: char| !ch.is_ascii_digit()).unwrap_or(line.len());
    let (number, rest) = line.split_at(digits_end);
    let places_text = rest
        .strip_prefix(SLOT_INDEX_DELIMITER)
        .filter(|_| !number.is_empty())
        .ok_or(ParseFailure::MalformedSlotLine { line: line_number })?;

    if number != line_number.to_string() {
        return Err(ParseFailure::SlotIndexMismatch {
            line: line_number,
            found: number.to_owned(),
        });
    }

    let places = places_text
        .split(PLACE_DELIMITER)
        .enumerate()
        .map(|(place, piece)| {
            parse_place(piece).ok_or(ParseFailure::EmptyPlace { slot: index, place })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Slot::from_places(places))
}

/// The pieces of a message text once a layout has recognised it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout<'t> {
    pub caption: Option<String>,
    pub info: Option<String>,
    pub slot_lines: &'t [&'t str],
}

/// One accepted message grammar.
pub trait LayoutMatcher: Sync {
    fn name(&self) -> &'static str;
    fn split<'t>(&self, lines: &'t [&'t str]) -> Option<Layout<'t>>;
}

/// Caption, separator, info block, separator, slots.
pub struct ExtendedLayout;

/// Caption, one separator of either width, slots. The only layout older messages use.
pub struct CompactLayout;

pub static LAYOUTS: &[&dyn LayoutMatcher] = &[&ExtendedLayout, &CompactLayout];

impl LayoutMatcher for ExtendedLayout {
    fn name(&self) -> &'static str {
        "extended"
    }

    fn split<'t>(&self, lines: &'t [&'t str]) -> Option<Layout<'t>> {
        let slots_separator = slot_block_separator(lines, |line| line == SEPARATOR)?;
        let info_separator = lines[..slots_separator.checked_sub(1)?]
            .iter()
            .rposition(|line| *line == SEPARATOR)?;

        Some(Layout {
            caption: joined(&lines[..info_separator]),
            info: Some(lines[info_separator + 1..slots_separator].join("\n")),
            slot_lines: &lines[slots_separator + 1..],
        })
    }
}

impl LayoutMatcher for CompactLayout {
    fn name(&self) -> &'static str {
        "compact"
    }

    fn split<'t>(&self, lines: &'t [&'t str]) -> Option<Layout<'t>> {
        let separator = slot_block_separator(lines, is_separator_line)?;

        Some(Layout {
            caption: joined(&lines[..separator]),
            info: None,
            slot_lines: &lines[separator + 1..],
        })
    }
}

/// Index of the last separator line directly followed by the first slot line.
fn slot_block_separator(lines: &[&str], is_separator: impl Fn(&str) -> bool) -> Option<usize> {
    lines
        .windows(2)
        .rposition(|pair| is_separator(pair[0]) && pair[1].starts_with(FIRST_SLOT_PREFIX))
}

fn joined(lines: &[&str]) -> Option<String> {
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        decode, decode_with_layout, encode, identity_text, parse_place, CompactLayout,
        ExtendedLayout, LayoutMatcher, FREE_MARKER, SEPARATOR,
    };
    use crate::board::{Board, Identity, Slot};
    use crate::errors::ParseFailure;

    fn amy() -> Identity {
        Identity::new(Some("@amy".to_owned()), Some("Amy Pond".to_owned())).expect("identity")
    }

    fn lunch_board() -> Board {
        Board::new(
            Some("Lunch".to_owned()),
            None,
            vec![
                Slot::from_places(vec![Some(amy()), None]),
                Slot::from_places(vec![Some(Identity::with_display_name("John")), None]),
            ],
        )
    }

    #[test]
    fn encodes_compact_board_with_caption() {
        assert_eq!(
            encode(&lunch_board()),
            format!("Lunch\n{SEPARATOR}\n1 - @amy (Amy Pond), —\n2 - John, —")
        );
    }

    #[test]
    fn encodes_info_block_between_two_separators() {
        let board = Board::new(
            None,
            Some("Bring plates".to_owned()),
            vec![Slot::from_places(vec![None])],
        );
        assert_eq!(encode(&board), format!("{SEPARATOR}\nBring plates\n{SEPARATOR}\n1 - —"));
    }

    #[test]
    fn decodes_what_it_encodes_for_both_layouts() {
        let compact = lunch_board();
        assert_eq!(decode(&encode(&compact)), Ok(compact.clone()));

        let mut extended = compact;
        extended.info = Some("Line one\nLine two".to_owned());
        assert_eq!(decode(&encode(&extended)), Ok(extended));
    }

    #[test]
    fn decodes_boards_without_caption() {
        let board = Board::new(None, None, vec![Slot::empty(2), Slot::empty(1)]);
        let text = encode(&board);
        assert!(text.starts_with(SEPARATOR));
        assert_eq!(decode(&text), Ok(board));
    }

    #[test]
    fn decodes_multiline_caption_in_compact_layout() {
        let board = Board::new(Some("Friday\nRoom 4".to_owned()), None, vec![Slot::empty(1)]);
        assert_eq!(decode(&encode(&board)), Ok(board));
    }

    #[test]
    fn decodes_legacy_layout_with_short_separator_and_legacy_free_marker() {
        let board = decode("Seats\n----------\n1 - вільно\n2 - Bob\n3 - вільно").expect("decode");

        assert_eq!(board.caption.as_deref(), Some("Seats"));
        assert_eq!(board.info, None);
        assert_eq!(board.slot_count(), 3);
        assert_eq!(board.slots()[0].places(), &[None]);
        assert_eq!(board.slots()[1].places(), &[Some(Identity::with_display_name("Bob"))]);
        assert_eq!(board.slots()[2].places(), &[None]);
    }

    #[test]
    fn reports_which_layout_recognised_the_text() {
        let compact = encode(&lunch_board());
        assert!(matches!(decode_with_layout(&compact), Ok((_, "compact"))));

        let extended = format!("{SEPARATOR}\nnotes\n{SEPARATOR}\n1 - —");
        assert!(matches!(decode_with_layout(&extended), Ok((_, "extended"))));
    }

    #[test]
    fn legacy_board_re_encodes_with_canonical_tokens() {
        let board = decode("----------\n1 - вільно").expect("decode");
        assert_eq!(encode(&board), format!("{SEPARATOR}\n1 - {FREE_MARKER}"));
    }

    #[test]
    fn rejects_skipped_or_repeated_slot_numbers() {
        let skipped = format!("{SEPARATOR}\n1 - —\n3 - —");
        assert_eq!(
            decode(&skipped),
            Err(ParseFailure::SlotIndexMismatch { line: 2, found: "3".to_owned() })
        );

        let repeated = format!("{SEPARATOR}\n1 - —\n1 - —");
        assert!(matches!(decode(&repeated), Err(ParseFailure::SlotIndexMismatch { line: 2, .. })));

        let padded = format!("{SEPARATOR}\n1 - —\n02 - —");
        assert!(matches!(decode(&padded), Err(ParseFailure::SlotIndexMismatch { line: 2, .. })));
    }

    #[test]
    fn rejects_text_without_a_slot_block() {
        assert_eq!(decode("just chatting"), Err(ParseFailure::UnrecognizedLayout));
        assert_eq!(decode(&format!("Lunch\n{SEPARATOR}")), Err(ParseFailure::UnrecognizedLayout));
        assert_eq!(decode("Lunch\n-----\n1 - —"), Err(ParseFailure::UnrecognizedLayout));
        assert_eq!(decode(""), Err(ParseFailure::UnrecognizedLayout));
    }

    #[test]
    fn rejects_malformed_slot_lines() {
        let trailing_newline = format!("{SEPARATOR}\n1 - —\n");
        assert_eq!(decode(&trailing_newline), Err(ParseFailure::MalformedSlotLine { line: 2 }));

        let missing_delimiter = format!("{SEPARATOR}\n1 - —\n2 -—");
        assert_eq!(decode(&missing_delimiter), Err(ParseFailure::MalformedSlotLine { line: 2 }));

        let empty_place = format!("{SEPARATOR}\n1 - @amy,, —");
        assert_eq!(decode(&empty_place), Err(ParseFailure::EmptyPlace { slot: 0, place: 1 }));
    }

    #[test]
    fn place_parsing_recognises_handle_forms() {
        assert_eq!(parse_place(" — "), Some(None));
        assert_eq!(parse_place("вільно"), Some(None));
        assert_eq!(parse_place("@amy"), Some(Some(Identity::with_handle("@amy"))));
        assert_eq!(parse_place("@amy (Amy Pond)"), Some(Some(amy())));
        assert_eq!(
            parse_place("@amy (Amy (work))"),
            Some(Identity::new(Some("@amy".to_owned()), Some("Amy (work)".to_owned())))
        );
        assert_eq!(
            parse_place("@amy is late"),
            Some(Some(Identity::with_display_name("@amy is late")))
        );
        assert_eq!(parse_place("@"), Some(Some(Identity::with_display_name("@"))));
        assert_eq!(parse_place("John Smith"), Some(Some(Identity::with_display_name("John Smith"))));
        assert_eq!(parse_place("  "), None);
    }

    #[test]
    fn identity_text_uses_both_components_when_present() {
        assert_eq!(identity_text(&amy()), "@amy (Amy Pond)");
        assert_eq!(identity_text(&Identity::with_handle("@amy")), "@amy");
        assert_eq!(identity_text(&Identity::with_display_name("John")), "John");
    }

    #[test]
    fn extended_layout_declines_single_separator_messages() {
        let text = format!("Lunch\n{SEPARATOR}\n1 - —");
        let lines = text.split('\n').collect::<Vec<_>>();
        assert!(ExtendedLayout.split(&lines).is_none());

        let layout = CompactLayout.split(&lines).expect("compact layout");
        assert_eq!(layout.caption.as_deref(), Some("Lunch"));
        assert_eq!(layout.slot_lines, &["1 - —"]);
    }

    #[test]
    fn caption_may_contain_a_legacy_separator_line() {
        let board = Board::new(Some("----------".to_owned()), None, vec![Slot::empty(1)]);
        assert_eq!(decode(&encode(&board)), Ok(board));
    }

    mod proptests {
        use proptest::prelude::*;

        use crate::board::{Board, Identity, Slot};
        use crate::codec::{decode, encode};

        fn text_component() -> impl Strategy<Value = String> {
            "[A-Za-z][A-Za-z0-9 .']{0,12}[A-Za-z0-9]"
        }

        fn identity() -> impl Strategy<Value = Identity> {
            (
                proptest::option::of("[a-z][a-z0-9_]{0,10}"),
                proptest::option::of(text_component()),
            )
                .prop_filter_map("identity needs a component", |(handle, display_name)| {
                    Identity::new(handle.map(|handle| format!("@{handle}")), display_name)
                })
        }

        fn slot() -> impl Strategy<Value = Slot> {
            proptest::collection::vec(proptest::option::of(identity()), 1..4)
                .prop_map(Slot::from_places)
        }

        fn board() -> impl Strategy<Value = Board> {
            (
                proptest::option::of(text_component()),
                proptest::option::of(text_component()),
                proptest::collection::vec(slot(), 1..12),
            )
                .prop_map(|(caption, info, slots)| Board::new(caption, info, slots))
        }

        proptest! {
            #[test]
            fn decode_inverts_encode(board in board()) {
                prop_assert_eq!(decode(&encode(&board)), Ok(board));
            }
        }
    }
}
