use async_trait::async_trait;
use slotboard_core::codec::is_separator_line;
use slotboard_core::config::LimitsConfig;
use slotboard_core::engine::create;
use slotboard_core::locale::{Locale, Message};
use slotboard_core::rotation::rotation_table;
use thiserror::Error;

use crate::blocks::{self, MessageTemplate};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlashCommandPayload {
    pub command: String,
    pub text: String,
    pub channel_id: String,
    pub user_id: String,
    pub trigger_ts: String,
    pub request_id: String,
    pub locale: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoardCommandKind {
    Select,
    Variants,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandEnvelope {
    pub kind: BoardCommandKind,
    pub args: String,
    pub channel_id: String,
    pub user_id: String,
    pub trigger_ts: String,
    pub request_id: String,
    pub locale: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoardCommand {
    Select { request: SelectRequest },
    Variants { request: VariantsRequest },
    Help,
}

/// `/select <count>[x<capacity>] [caption]` with any further lines as the info block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectRequest {
    pub count: usize,
    pub capacity: usize,
    pub caption: Option<String>,
    pub info: Option<String>,
}

/// `/variants <count>+<offset>[/<limit>]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VariantsRequest {
    pub count: usize,
    pub offset: usize,
    pub limit: Option<usize>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("unsupported slash command: {0}")]
    UnsupportedCommand(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandRouteError {
    #[error("command arguments do not match the expected pattern")]
    MalformedArguments,
    #[error("variant count {count} is outside {low}..={high}")]
    VariantCount { count: usize, low: usize, high: usize },
    #[error("place count {capacity} is outside {low}..={high}")]
    PlaceCount { capacity: usize, low: usize, high: usize },
    #[error("board of {total} places exceeds the ceiling of {ceiling}")]
    TotalPlaces { total: usize, ceiling: usize },
    #[error("caption or description contains a separator line")]
    SeparatorInText,
    #[error("command service failed: {0}")]
    Service(String),
}

impl CommandRouteError {
    /// The reason shown to the user inside the generic failure reply, if there is one.
    pub fn user_message(&self) -> Option<Message> {
        match self {
            Self::MalformedArguments | Self::Service(_) => None,
            Self::VariantCount { low, high, .. } => {
                Some(Message::VariantCountRange { low: *low, high: *high })
            }
            Self::PlaceCount { low, high, .. } => {
                Some(Message::PlaceCountRange { low: *low, high: *high })
            }
            Self::TotalPlaces { ceiling, .. } => {
                Some(Message::TotalPlacesCeiling { value: *ceiling })
            }
            Self::SeparatorInText => Some(Message::SeparatorInText),
        }
    }
}

pub fn normalize_board_command(
    payload: SlashCommandPayload,
) -> Result<CommandEnvelope, CommandParseError> {
    let kind = match payload.command.as_str() {
        "/select" => BoardCommandKind::Select,
        "/variants" => BoardCommandKind::Variants,
        _ => return Err(CommandParseError::UnsupportedCommand(payload.command)),
    };

    Ok(CommandEnvelope {
        kind,
        args: payload.text.trim().to_owned(),
        channel_id: payload.channel_id,
        user_id: payload.user_id,
        trigger_ts: payload.trigger_ts,
        request_id: payload.request_id,
        locale: payload.locale,
    })
}

pub fn parse_board_command(
    kind: BoardCommandKind,
    args: &str,
) -> Result<BoardCommand, CommandRouteError> {
    let args = args.trim();
    match kind {
        BoardCommandKind::Select if args.is_empty() || args.eq_ignore_ascii_case("help") => {
            Ok(BoardCommand::Help)
        }
        BoardCommandKind::Select => parse_select(args).map(|request| BoardCommand::Select { request }),
        BoardCommandKind::Variants => {
            parse_variants(args).map(|request| BoardCommand::Variants { request })
        }
    }
}

/// Parses `<count>[x<capacity>][<whitespace><caption>]`. The first line after the count spec is
/// the caption; later non-blank lines form the info block.
pub fn parse_select(args: &str) -> Result<SelectRequest, CommandRouteError> {
    let (count, rest) = take_number(args).ok_or(CommandRouteError::MalformedArguments)?;

    let (capacity, rest) = match rest.strip_prefix('x') {
        Some(after_x) => take_number(after_x).ok_or(CommandRouteError::MalformedArguments)?,
        None => (1, rest),
    };

    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return Err(CommandRouteError::MalformedArguments);
    }

    let mut lines = rest.trim().lines().map(str::trim);
    let caption = lines.next().filter(|line| !line.is_empty()).map(str::to_owned);
    let info = lines.filter(|line| !line.is_empty()).collect::<Vec<_>>().join("\n");
    let info = (!info.is_empty()).then_some(info);

    Ok(SelectRequest { count, capacity, caption, info })
}

pub fn parse_variants(args: &str) -> Result<VariantsRequest, CommandRouteError> {
    let (count, rest) = take_number(args).ok_or(CommandRouteError::MalformedArguments)?;
    let rest = rest.strip_prefix('+').ok_or(CommandRouteError::MalformedArguments)?;
    let (offset, rest) = take_number(rest).ok_or(CommandRouteError::MalformedArguments)?;

    let limit = match rest.strip_prefix('/') {
        Some(after_slash) => match take_number(after_slash) {
            Some((limit, "")) => Some(limit),
            _ => return Err(CommandRouteError::MalformedArguments),
        },
        None if rest.is_empty() => None,
        None => return Err(CommandRouteError::MalformedArguments),
    };

    if count == 0 {
        return Err(CommandRouteError::MalformedArguments);
    }

    Ok(VariantsRequest { count, offset, limit })
}

impl SelectRequest {
    pub fn validate(&self, limits: &LimitsConfig) -> Result<(), CommandRouteError> {
        if !(limits.min_variants..=limits.max_variants).contains(&self.count) {
            return Err(CommandRouteError::VariantCount {
                count: self.count,
                low: limits.min_variants,
                high: limits.max_variants,
            });
        }

        if !(limits.min_places..=limits.max_places).contains(&self.capacity) {
            return Err(CommandRouteError::PlaceCount {
                capacity: self.capacity,
                low: limits.min_places,
                high: limits.max_places,
            });
        }

        let total = self.count.saturating_mul(self.capacity);
        if total > limits.max_total_places {
            return Err(CommandRouteError::TotalPlaces {
                total,
                ceiling: limits.max_total_places,
            });
        }

        let caption_lines = self.caption.iter().flat_map(|caption| caption.lines());
        let info_lines = self.info.iter().flat_map(|info| info.lines());
        if caption_lines.chain(info_lines).any(is_separator_line) {
            return Err(CommandRouteError::SeparatorInText);
        }

        Ok(())
    }
}

/// Leading ASCII digits as a number plus the remainder. Digit runs too long for `usize` saturate
/// so they fail range checks instead of the pattern.
fn take_number(text: &str) -> Option<(usize, &str)> {
    let end = text.find(|ch: char| !ch.is_ascii_digit()).unwrap_or(text.len());
    if end == 0 {
        return None;
    }
    let (digits, rest) = text.split_at(end);
    Some((digits.parse().unwrap_or(usize::MAX), rest))
}

pub struct CommandRouter<S> {
    service: S,
    limits: LimitsConfig,
}

impl<S> CommandRouter<S>
where
    S: BoardCommandService,
{
    pub fn new(service: S, limits: LimitsConfig) -> Self {
        Self { service, limits }
    }

    pub async fn route(
        &self,
        envelope: &CommandEnvelope,
        locale: Locale,
    ) -> Result<MessageTemplate, CommandRouteError> {
        match parse_board_command(envelope.kind, &envelope.args)? {
            BoardCommand::Select { request } => {
                request.validate(&self.limits)?;
                self.service.select(request, locale, envelope).await
            }
            BoardCommand::Variants { request } => self.service.variants(request, envelope).await,
            BoardCommand::Help => Ok(blocks::help_message(locale)),
        }
    }
}

#[async_trait]
pub trait BoardCommandService: Send + Sync {
    async fn select(
        &self,
        request: SelectRequest,
        locale: Locale,
        envelope: &CommandEnvelope,
    ) -> Result<MessageTemplate, CommandRouteError>;

    async fn variants(
        &self,
        request: VariantsRequest,
        envelope: &CommandEnvelope,
    ) -> Result<MessageTemplate, CommandRouteError>;
}

/// Posts fresh boards and rotation tables.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoardCommandHandler;

#[async_trait]
impl BoardCommandService for BoardCommandHandler {
    async fn select(
        &self,
        request: SelectRequest,
        locale: Locale,
        _envelope: &CommandEnvelope,
    ) -> Result<MessageTemplate, CommandRouteError> {
        let board = create(request.caption, request.info, request.count, request.capacity);
        Ok(blocks::board_message(&board, locale))
    }

    async fn variants(
        &self,
        request: VariantsRequest,
        _envelope: &CommandEnvelope,
    ) -> Result<MessageTemplate, CommandRouteError> {
        let rows = rotation_table(request.count, request.offset, request.limit);
        Ok(blocks::variants_message(&rows))
    }
}
