//! Slack interface for slot boards.
//!
//! - **Socket Mode** (`socket`) - WebSocket event loop with reconnection, no public URL needed
//! - **Slash Commands** (`commands`) - `/select` posts a board, `/variants` prints a rotation table
//! - **Events** (`events`) - routes slash commands and board button presses
//! - **Block Kit** (`blocks`) - board message, slot button rows, notices
//!
//! # Flow
//!
//! ```text
//! Slack envelope → EventDispatcher → Handler → decode → engine → encode
//!                                        ↓
//!                     Block Kit board message / ephemeral notice
//! ```
//!
//! The board message text is the board state; nothing is stored between interactions.

pub mod blocks;
pub mod commands;
pub mod events;
pub mod socket;
