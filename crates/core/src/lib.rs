pub mod board;
pub mod codec;
pub mod config;
pub mod engine;
pub mod errors;
pub mod locale;
pub mod rotation;

pub use board::{Board, Identity, PlatformUser, Slot};
pub use codec::{decode, decode_with_layout, encode, LayoutMatcher, LAYOUTS};
pub use engine::{
    create, enter, find_assignment, join_place, leave, leave_place, same_participant, Assignment,
};
pub use errors::{ParseFailure, TransitionRejected};
pub use locale::{Locale, Message};
pub use rotation::{render_rotation_table, rotation_table, Rotation};
