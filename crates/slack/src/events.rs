use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use slotboard_core::board::{Identity, PlatformUser};
use slotboard_core::codec::decode;
use slotboard_core::config::LimitsConfig;
use slotboard_core::engine::{enter, leave};
use slotboard_core::errors::TransitionRejected;
use slotboard_core::locale::{Locale, Message};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    blocks::{self, parse_enter_action, unescape_text, MessageTemplate, LEAVE_ACTION_ID},
    commands::{
        normalize_board_command, BoardCommandHandler, BoardCommandService, CommandParseError,
        CommandRouteError, CommandRouter, SlashCommandPayload,
    },
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlackEnvelope {
    pub envelope_id: String,
    pub event: SlackEvent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlackEvent {
    SlashCommand(SlashCommandPayload),
    BlockAction(BlockActionEvent),
    Unsupported { event_type: String },
}

impl SlackEvent {
    pub fn event_type(&self) -> SlackEventType {
        match self {
            Self::SlashCommand(_) => SlackEventType::SlashCommand,
            Self::BlockAction(_) => SlackEventType::BlockAction,
            Self::Unsupported { .. } => SlackEventType::Unsupported,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlackEventType {
    SlashCommand,
    BlockAction,
    Unsupported,
}

/// A button press on a board message. `message_text` is the message's text exactly as Slack
/// delivered it, still escaped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockActionEvent {
    pub channel_id: String,
    pub message_ts: String,
    pub user_id: String,
    pub user: PlatformUser,
    pub locale: Option<String>,
    pub action_id: String,
    pub value: Option<String>,
    pub message_text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerResult {
    /// Post a new message in the channel.
    Responded(MessageTemplate),
    /// Replace the message the action came from and acknowledge the press.
    Updated { message: MessageTemplate, notice: String },
    /// Acknowledge the press without touching the message.
    Notice(String),
    Processed,
    Ignored,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventHandlerError {
    #[error(transparent)]
    Parse(#[from] CommandParseError),
    #[error(transparent)]
    Route(#[from] CommandRouteError),
    #[error("board action handler failure: {0}")]
    BoardAction(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    Handler(#[from] EventHandlerError),
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    fn event_type(&self) -> SlackEventType;
    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError>;
}

#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<SlackEventType, Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.handlers.insert(handler.event_type(), Arc::new(handler));
    }

    pub async fn dispatch(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, DispatchError> {
        let Some(handler) = self.handlers.get(&envelope.event.event_type()) else {
            return Ok(HandlerResult::Ignored);
        };

        handler.handle(envelope, ctx).await.map_err(DispatchError::from)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

pub fn default_dispatcher() -> EventDispatcher {
    board_dispatcher(LimitsConfig::default(), Locale::default())
}

/// Dispatcher wired with the stock command and button services.
pub fn board_dispatcher(limits: LimitsConfig, default_locale: Locale) -> EventDispatcher {
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(SlashCommandHandler::new(BoardCommandHandler, limits, default_locale));
    dispatcher.register(BlockActionHandler::new(BoardInteractionService, default_locale));
    dispatcher
}

pub struct SlashCommandHandler<S> {
    router: CommandRouter<S>,
    default_locale: Locale,
}

impl<S> SlashCommandHandler<S>
where
    S: BoardCommandService,
{
    pub fn new(service: S, limits: LimitsConfig, default_locale: Locale) -> Self {
        Self { router: CommandRouter::new(service, limits), default_locale }
    }
}

#[async_trait]
impl<S> EventHandler for SlashCommandHandler<S>
where
    S: BoardCommandService + 'static,
{
    fn event_type(&self) -> SlackEventType {
        SlackEventType::SlashCommand
    }

    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let SlackEvent::SlashCommand(payload) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };

        let normalized = normalize_board_command(payload.clone())?;
        let locale = Locale::from_language_code(normalized.locale.as_deref(), self.default_locale);

        match self.router.route(&normalized, locale).await {
            Ok(message) => Ok(HandlerResult::Responded(message)),
            Err(error @ CommandRouteError::Service(_)) => Err(error.into()),
            Err(error) => {
                info!(
                    event_name = "command.board.rejected",
                    correlation_id = %ctx.correlation_id,
                    command = ?normalized.kind,
                    reason = %error,
                    "slash command rejected"
                );
                let detail = error.user_message().map(|message| locale.render(&message));
                Ok(HandlerResult::Responded(blocks::failure_message(locale, detail)))
            }
        }
    }
}

/// What a board button asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoardAction {
    Enter { slot: usize },
    Leave,
}

impl BoardAction {
    pub fn from_action_id(action_id: &str) -> Option<Self> {
        if action_id == LEAVE_ACTION_ID {
            return Some(Self::Leave);
        }
        parse_enter_action(action_id).map(|slot| Self::Enter { slot })
    }
}

pub fn rejection_message(rejection: &TransitionRejected) -> Message {
    match rejection {
        TransitionRejected::AlreadyAssigned { .. } => Message::AlreadySelected,
        TransitionRejected::SlotFull { .. } | TransitionRejected::UnknownSlot { .. } => {
            Message::NoFreePlaces
        }
        TransitionRejected::NothingToLeave => Message::NothingSelected,
    }
}

#[async_trait]
pub trait BoardActionService: Send + Sync {
    async fn handle_board_action(
        &self,
        action: BoardAction,
        event: &BlockActionEvent,
        locale: Locale,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError>;
}

pub struct BlockActionHandler<S> {
    service: S,
    default_locale: Locale,
}

impl<S> BlockActionHandler<S>
where
    S: BoardActionService,
{
    pub fn new(service: S, default_locale: Locale) -> Self {
        Self { service, default_locale }
    }
}

#[async_trait]
impl<S> EventHandler for BlockActionHandler<S>
where
    S: BoardActionService + 'static,
{
    fn event_type(&self) -> SlackEventType {
        SlackEventType::BlockAction
    }

    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let SlackEvent::BlockAction(event) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };
        let Some(action) = BoardAction::from_action_id(&event.action_id) else {
            return Ok(HandlerResult::Ignored);
        };

        let locale = Locale::from_language_code(event.locale.as_deref(), self.default_locale);
        self.service.handle_board_action(action, event, locale, ctx).await
    }
}

/// Decodes the board from the pressed message, applies one transition and re-renders it.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoardInteractionService;

#[async_trait]
impl BoardActionService for BoardInteractionService {
    async fn handle_board_action(
        &self,
        action: BoardAction,
        event: &BlockActionEvent,
        locale: Locale,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let generic_failure = || {
            HandlerResult::Notice(locale.render(&Message::SomethingWentWrong { detail: None }))
        };

        let board = match decode(&unescape_text(&event.message_text)) {
            Ok(board) => board,
            Err(failure) => {
                warn!(
                    event_name = "interaction.board.unreadable",
                    correlation_id = %ctx.correlation_id,
                    channel_id = %event.channel_id,
                    message_ts = %event.message_ts,
                    error = %failure,
                    "board message could not be decoded"
                );
                return Ok(generic_failure());
            }
        };

        let Some(identity) = Identity::from_user(&event.user) else {
            warn!(
                event_name = "interaction.board.anonymous",
                correlation_id = %ctx.correlation_id,
                user_id = %event.user_id,
                "pressing user has neither a username nor a name"
            );
            return Ok(generic_failure());
        };

        let outcome = match action {
            BoardAction::Enter { slot } => enter(&board, slot, &identity),
            BoardAction::Leave => leave(&board, &identity),
        };

        match outcome {
            Ok(next) => {
                info!(
                    event_name = "interaction.board.updated",
                    correlation_id = %ctx.correlation_id,
                    channel_id = %event.channel_id,
                    message_ts = %event.message_ts,
                    action = ?action,
                    "board updated"
                );
                Ok(HandlerResult::Updated {
                    message: blocks::board_message(&next, locale),
                    notice: locale.render(&Message::Ok),
                })
            }
            Err(rejection) => {
                info!(
                    event_name = "interaction.board.rejected",
                    correlation_id = %ctx.correlation_id,
                    channel_id = %event.channel_id,
                    message_ts = %event.message_ts,
                    action = ?action,
                    reason = %rejection,
                    "board transition rejected"
                );
                let detail = locale.render(&rejection_message(&rejection));
                Ok(HandlerResult::Notice(
                    locale.render(&Message::SomethingWentWrong { detail: Some(detail) }),
                ))
            }
        }
    }
}
