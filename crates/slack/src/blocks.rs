use serde::Serialize;
use slotboard_core::codec::encode;
use slotboard_core::locale::{Locale, Message};
use slotboard_core::rotation::{render_rotation_table, Rotation};
use slotboard_core::Board;

/// Widest row of slot buttons; wider rows get truncated on narrow clients.
pub const MAX_BUTTONS_PER_ROW: usize = 8;
/// Slack rejects section text longer than this many characters.
pub const MAX_SECTION_TEXT_CHARS: usize = 3000;

pub const ENTER_ACTION_PREFIX: &str = "enter:";
pub const LEAVE_ACTION_ID: &str = "leave";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    #[serde(rename = "plain_text")]
    Plain { text: String },
    Mrkdwn { text: String },
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain { text: text.into() }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
    Danger,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ButtonElement {
    #[serde(rename = "type")]
    kind: &'static str,
    pub action_id: String,
    pub text: TextObject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ButtonStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ButtonElement {
    pub fn new(action_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: "button",
            action_id: action_id.into(),
            text: TextObject::plain(label),
            style: None,
            value: None,
        }
    }

    pub fn style(mut self, style: ButtonStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section { block_id: String, text: TextObject },
    Actions { block_id: String, elements: Vec<ButtonElement> },
    Context { block_id: String, elements: Vec<TextObject> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageTemplate {
    #[serde(rename = "text")]
    pub fallback_text: String,
    pub blocks: Vec<Block>,
}

pub struct MessageBuilder {
    fallback_text: String,
    blocks: Vec<Block>,
}

impl MessageBuilder {
    pub fn new(fallback_text: impl Into<String>) -> Self {
        Self { fallback_text: fallback_text.into(), blocks: Vec::new() }
    }

    pub fn section<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut SectionBuilder),
    {
        let mut builder = SectionBuilder::default();
        build(&mut builder);
        self.blocks.push(Block::Section { block_id: block_id.into(), text: builder.build() });
        self
    }

    pub fn actions<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut ActionsBuilder),
    {
        let mut builder = ActionsBuilder::default();
        build(&mut builder);
        self.blocks.push(Block::Actions { block_id: block_id.into(), elements: builder.build() });
        self
    }

    pub fn context<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut ContextBuilder),
    {
        let mut builder = ContextBuilder::default();
        build(&mut builder);
        self.blocks.push(Block::Context { block_id: block_id.into(), elements: builder.build() });
        self
    }

    pub fn build(self) -> MessageTemplate {
        MessageTemplate { fallback_text: self.fallback_text, blocks: self.blocks }
    }
}

#[derive(Default)]
pub struct SectionBuilder {
    text: Option<TextObject>,
}

impl SectionBuilder {
    pub fn plain(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(TextObject::plain(text));
        self
    }

    pub fn mrkdwn(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(TextObject::mrkdwn(text));
        self
    }

    fn build(self) -> TextObject {
        self.text.unwrap_or_else(|| TextObject::plain(""))
    }
}

#[derive(Default)]
pub struct ActionsBuilder {
    elements: Vec<ButtonElement>,
}

impl ActionsBuilder {
    pub fn button(&mut self, button: ButtonElement) -> &mut Self {
        self.elements.push(button);
        self
    }

    fn build(self) -> Vec<ButtonElement> {
        self.elements
    }
}

#[derive(Default)]
pub struct ContextBuilder {
    elements: Vec<TextObject>,
}

impl ContextBuilder {
    pub fn plain(&mut self, text: impl Into<String>) -> &mut Self {
        self.elements.push(TextObject::plain(text));
        self
    }

    pub fn mrkdwn(&mut self, text: impl Into<String>) -> &mut Self {
        self.elements.push(TextObject::mrkdwn(text));
        self
    }

    fn build(self) -> Vec<TextObject> {
        self.elements
    }
}

/// Escapes the three characters Slack reserves in message text.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

pub fn unescape_text(text: &str) -> String {
    text.replace("&lt;", "<").replace("&gt;", ">").replace("&amp;", "&")
}

/// Row width for `total` slot buttons: the widest even split with at least three and at most
/// eight buttons per row, otherwise roughly square.
pub fn buttons_per_row(total: usize) -> usize {
    let square = (total as f64).sqrt().floor() as usize;

    let even_split = (3..total)
        .filter(|divisor| total % divisor == 0)
        .map(|divisor| total / divisor)
        .find(|width| (3..=MAX_BUTTONS_PER_ROW).contains(width));

    even_split.unwrap_or(square).clamp(1, MAX_BUTTONS_PER_ROW)
}

pub fn enter_action_id(slot_index: usize) -> String {
    format!("{ENTER_ACTION_PREFIX}{slot_index}")
}

/// The slot index carried by an `enter:<index>` action id.
pub fn parse_enter_action(action_id: &str) -> Option<usize> {
    let digits = action_id.strip_prefix(ENTER_ACTION_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// The board message. Its `text` is the encoded board, which Slack hands back with every button
/// press, so the message itself is the only copy of the state.
pub fn board_message(board: &Board, locale: Locale) -> MessageTemplate {
    let encoded = encode(board);
    let slot_count = board.slot_count();
    let row_width = buttons_per_row(slot_count);
    let indexes = (0..slot_count).collect::<Vec<_>>();

    let mut builder = MessageBuilder::new(escape_text(&encoded));
    let parts = split_section_text(&encoded, MAX_SECTION_TEXT_CHARS);
    for (part, text) in parts.into_iter().enumerate() {
        let block_id =
            if part == 0 { "board.state.v1".to_owned() } else { format!("board.state.{part}.v1") };
        builder = builder.section(block_id, |section| {
            section.plain(text);
        });
    }

    for (row, chunk) in indexes.chunks(row_width).enumerate() {
        builder = builder.actions(format!("board.slots.{row}.v1"), |actions| {
            for &index in chunk {
                actions.button(
                    ButtonElement::new(enter_action_id(index), (index + 1).to_string())
                        .value(index.to_string()),
                );
            }
        });
    }

    builder
        .actions("board.leave.v1", |actions| {
            actions.button(
                ButtonElement::new(LEAVE_ACTION_ID, locale.render(&Message::CancelSelection))
                    .style(ButtonStyle::Danger),
            );
        })
        .build()
}

/// Splits `text` into pieces of at most `max_chars` characters, breaking between lines.
/// A single line longer than `max_chars` is broken mid-line.
pub fn split_section_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut pieces = Vec::new();
    let mut current: Option<(String, usize)> = None;

    for line in text.split('\n') {
        let line_chars = line.chars().count();
        if let Some((piece, piece_chars)) = current.as_mut() {
            if *piece_chars + 1 + line_chars <= max_chars {
                piece.push('\n');
                piece.push_str(line);
                *piece_chars += 1 + line_chars;
                continue;
            }
        }
        if let Some((piece, _)) = current.take() {
            pieces.push(piece);
        }

        let chars = line.chars().collect::<Vec<_>>();
        let mut chunks = chars.chunks(max_chars).peekable();
        while let Some(chunk) = chunks.next() {
            if chunks.peek().is_some() {
                pieces.push(chunk.iter().collect());
            } else {
                current = Some((chunk.iter().collect(), chunk.len()));
            }
        }
        if chars.is_empty() {
            current = Some((String::new(), 0));
        }
    }

    pieces.extend(current.map(|(piece, _)| piece));
    pieces
}

pub fn failure_message(locale: Locale, detail: Option<String>) -> MessageTemplate {
    let text = locale.render(&Message::SomethingWentWrong { detail });
    MessageBuilder::new(escape_text(&text))
        .section("board.failure.v1", |section| {
            section.plain(text.clone());
        })
        .build()
}

pub fn variants_message(rows: &[Rotation]) -> MessageTemplate {
    let table = format!("```\n{}\n```", render_rotation_table(rows));
    MessageBuilder::new(table.clone())
        .section("variants.table.v1", |section| {
            section.mrkdwn(table);
        })
        .build()
}

pub fn help_message(locale: Locale) -> MessageTemplate {
    MessageBuilder::new("Slot board help")
        .section("board.help.summary.v1", |section| {
            section.mrkdwn(locale.render(&Message::Help));
        })
        .context("board.help.context.v1", |context| {
            context.plain(format!("Example: /select 4x2 Lunch ({})", locale.code()));
        })
        .build()
}
