use serde::{Deserialize, Serialize};

use crate::codec::is_free_marker;

/// A participant reference. At least one of `handle` or `display_name` is always present.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    handle: Option<String>,
    display_name: Option<String>,
}

impl Identity {
    pub fn new(handle: Option<String>, display_name: Option<String>) -> Option<Self> {
        if handle.is_none() && display_name.is_none() {
            return None;
        }
        Some(Self { handle, display_name })
    }

    pub fn with_handle(handle: impl Into<String>) -> Self {
        Self { handle: Some(handle.into()), display_name: None }
    }

    pub fn with_display_name(display_name: impl Into<String>) -> Self {
        Self { handle: None, display_name: Some(display_name.into()) }
    }

    pub fn handle(&self) -> Option<&str> {
        self.handle.as_deref()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Builds the identity for a platform user, sanitising both components so the rendered
    /// place decodes back to the same identity.
    pub fn from_user(user: &PlatformUser) -> Option<Self> {
        let handle = user
            .username
            .as_deref()
            .map(sanitize_username)
            .filter(|username| !username.is_empty())
            .map(|username| format!("@{username}"));

        let full_name = match user.last_name.as_deref() {
            Some(last_name) => format!("{} {last_name}", user.first_name),
            None => user.first_name.clone(),
        };
        let display_name = Some(sanitize_display_name(&full_name))
            .filter(|name| !name.is_empty() && !is_free_marker(name));

        Self::new(handle, display_name)
    }
}

/// Platform-neutral user fields supplied with every interaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlatformUser {
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

fn sanitize_username(raw: &str) -> String {
    raw.trim_start_matches('@')
        .chars()
        .filter(|ch| !ch.is_whitespace() && !matches!(ch, ',' | '(' | ')'))
        .collect()
}

fn sanitize_display_name(raw: &str) -> String {
    let spaced: String =
        raw.chars().map(|ch| if matches!(ch, ',' | '\r' | '\n') { ' ' } else { ch }).collect();
    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.trim_start_matches(|ch: char| ch == '@' || ch.is_whitespace()).to_owned()
}

/// One numbered line of the board: a fixed number of places, each free or taken.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    places: Vec<Option<Identity>>,
}

impl Slot {
    pub fn empty(capacity: usize) -> Self {
        Self { places: vec![None; capacity] }
    }

    pub fn from_places(places: Vec<Option<Identity>>) -> Self {
        Self { places }
    }

    pub fn capacity(&self) -> usize {
        self.places.len()
    }

    pub fn places(&self) -> &[Option<Identity>] {
        &self.places
    }

    pub fn free_places(&self) -> usize {
        self.places.iter().filter(|place| place.is_none()).count()
    }

    pub(crate) fn place_mut(&mut self, index: usize) -> Option<&mut Option<Identity>> {
        self.places.get_mut(index)
    }
}

/// The decoded state of one message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub caption: Option<String>,
    pub info: Option<String>,
    slots: Vec<Slot>,
}

impl Board {
    pub fn new(caption: Option<String>, info: Option<String>, slots: Vec<Slot>) -> Self {
        Self { caption, info, slots }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut Slot> {
        self.slots.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::{Identity, PlatformUser, Slot};
    use crate::codec::{decode, encode};
    use crate::engine::{create, enter, leave};

    fn user(username: Option<&str>, first_name: &str, last_name: Option<&str>) -> PlatformUser {
        PlatformUser {
            username: username.map(str::to_owned),
            first_name: first_name.to_owned(),
            last_name: last_name.map(str::to_owned),
        }
    }

    #[test]
    fn identity_requires_at_least_one_component() {
        assert!(Identity::new(None, None).is_none());
        assert!(Identity::new(Some("@amy".to_owned()), None).is_some());
        assert!(Identity::new(None, Some("Amy".to_owned())).is_some());
    }

    #[test]
    fn from_user_prefixes_username_and_joins_names() {
        let identity = Identity::from_user(&user(Some("amy"), "Amy", Some("Pond"))).expect("id");
        assert_eq!(identity.handle(), Some("@amy"));
        assert_eq!(identity.display_name(), Some("Amy Pond"));
    }

    #[test]
    fn from_user_without_username_uses_display_name_only() {
        let identity = Identity::from_user(&user(None, "John", None)).expect("id");
        assert_eq!(identity.handle(), None);
        assert_eq!(identity.display_name(), Some("John"));
    }

    #[test]
    fn from_user_strips_characters_that_break_the_place_grammar() {
        let identity =
            Identity::from_user(&user(Some("a my"), "@Smith,\nJohn", None)).expect("identity");
        assert_eq!(identity.handle(), Some("@amy"));
        assert_eq!(identity.display_name(), Some("Smith John"));
    }

    #[test]
    fn from_user_drops_display_names_that_look_like_free_places() {
        let identity = Identity::from_user(&user(Some("amy"), "—", None)).expect("identity");
        assert_eq!(identity.display_name(), None);
        assert!(Identity::from_user(&user(None, "  ", None)).is_none());
    }

    #[test]
    fn from_user_strips_interleaved_at_signs_and_spaces() {
        let identity = Identity::from_user(&user(None, "@ @x", None)).expect("identity");
        assert_eq!(identity.handle(), None);
        assert_eq!(identity.display_name(), Some("x"));
    }

    #[test]
    fn handle_less_user_with_at_prefixed_name_can_join_and_leave() {
        let identity = Identity::from_user(&user(None, "@ @x", None)).expect("identity");
        let board = enter(&create(None, None, 2, 1), 0, &identity).expect("enter");

        let decoded = decode(&encode(&board)).expect("decode");
        assert_eq!(decoded, board);
        assert!(enter(&decoded, 1, &identity).is_err());

        let left = leave(&decoded, &identity).expect("leave");
        assert_eq!(left, create(None, None, 2, 1));
    }

    #[test]
    fn slot_counts_free_places() {
        let slot = Slot::from_places(vec![None, Some(Identity::with_handle("@amy")), None]);
        assert_eq!(slot.capacity(), 3);
        assert_eq!(slot.free_places(), 2);
    }
}
