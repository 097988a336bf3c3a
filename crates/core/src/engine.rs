use serde::Serialize;

use crate::board::{Board, Identity, Slot};
use crate::errors::TransitionRejected;

/// Handle text the historical encoder wrote for users without a username.
pub const LEGACY_UNDEFINED_HANDLE: &str = "@undefined";

/// Position of a taken place: slot index and place index within that slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub slot: usize,
    pub place: usize,
}

pub fn create(
    caption: Option<String>,
    info: Option<String>,
    slot_count: usize,
    capacity: usize,
) -> Board {
    Board::new(caption, info, (0..slot_count).map(|_| Slot::empty(capacity)).collect())
}

/// Whether `stored` (read back from the message) is the same participant as `query`.
pub fn same_participant(query: &Identity, stored: &Identity) -> bool {
    // Old messages carry `@undefined` for users that had no username.
    // Only a handle-less query matches it.
    if query.handle().is_none() && stored.handle() == Some(LEGACY_UNDEFINED_HANDLE) {
        return true;
    }

    if let (Some(query_handle), Some(stored_handle)) = (query.handle(), stored.handle()) {
        if query_handle == stored_handle {
            return true;
        }
    }

    // Absent display names never match each other.
    matches!(
        (query.display_name(), stored.display_name()),
        (Some(query_name), Some(stored_name)) if query_name == stored_name
    )
}

pub fn find_assignment(board: &Board, identity: &Identity) -> Option<Assignment> {
    board.slots().iter().enumerate().find_map(|(slot, entry)| {
        entry
            .places()
            .iter()
            .position(|place| place.as_ref().is_some_and(|stored| same_participant(identity, stored)))
            .map(|place| Assignment { slot, place })
    })
}

/// Puts `identity` into the first free place of the slot. Absent when the slot is full or
/// does not exist. Does not check whether the identity already holds another place.
pub fn join_place(board: &Board, slot_index: usize, identity: &Identity) -> Option<Board> {
    let free_place = board.slot(slot_index)?.places().iter().position(Option::is_none)?;

    let mut next = board.clone();
    *next.slot_mut(slot_index)?.place_mut(free_place)? = Some(identity.clone());
    Some(next)
}

/// Frees the place held by `identity`. Absent when it holds none.
pub fn leave_place(board: &Board, identity: &Identity) -> Option<Board> {
    let Assignment { slot, place } = find_assignment(board, identity)?;

    let mut next = board.clone();
    *next.slot_mut(slot)?.place_mut(place)? = None;
    Some(next)
}

/// Joins a slot, refusing identities that already hold a place anywhere on the board.
pub fn enter(
    board: &Board,
    slot_index: usize,
    identity: &Identity,
) -> Result<Board, TransitionRejected> {
    if let Some(Assignment { slot, place }) = find_assignment(board, identity) {
        return Err(TransitionRejected::AlreadyAssigned { slot, place });
    }
    if slot_index >= board.slot_count() {
        return Err(TransitionRejected::UnknownSlot { slot: slot_index });
    }

    join_place(board, slot_index, identity)
        .ok_or(TransitionRejected::SlotFull { slot: slot_index })
}

pub fn leave(board: &Board, identity: &Identity) -> Result<Board, TransitionRejected> {
    leave_place(board, identity).ok_or(TransitionRejected::NothingToLeave)
}

#[cfg(test)]
mod tests {
    use super::{
        create, enter, find_assignment, join_place, leave, leave_place, same_participant,
        Assignment, LEGACY_UNDEFINED_HANDLE,
    };
    use crate::board::Identity;
    use crate::codec::{decode, encode, SEPARATOR};
    use crate::errors::TransitionRejected;

    fn amy() -> Identity {
        Identity::with_handle("@amy")
    }

    #[test]
    fn create_fills_every_place_with_none() {
        let board = create(Some("Lunch".to_owned()), None, 3, 2);

        assert_eq!(board.slot_count(), 3);
        assert!(board.slots().iter().all(|slot| slot.capacity() == 2 && slot.free_places() == 2));
    }

    #[test]
    fn lunch_scenario_joins_and_leaves_through_the_text() {
        let created = encode(&create(Some("Lunch".to_owned()), None, 2, 1));
        assert_eq!(created, format!("Lunch\n{SEPARATOR}\n1 - —\n2 - —"));

        let joined = join_place(&decode(&created).expect("decode"), 0, &amy()).expect("join");
        let joined_text = encode(&joined);
        assert_eq!(joined_text, format!("Lunch\n{SEPARATOR}\n1 - @amy\n2 - —"));

        let left = leave_place(&decode(&joined_text).expect("decode"), &amy()).expect("leave");
        assert_eq!(encode(&left), created);
    }

    #[test]
    fn handles_without_display_names_do_not_match_on_the_missing_name() {
        assert!(!same_participant(&amy(), &Identity::with_handle("@bob")));
        assert!(same_participant(&amy(), &amy()));
    }

    #[test]
    fn join_place_fills_first_free_place_only() {
        let board = create(None, None, 1, 3);
        let once = join_place(&board, 0, &amy()).expect("first join");
        let twice = join_place(&once, 0, &Identity::with_handle("@bob")).expect("second join");

        assert_eq!(
            twice.slots()[0].places(),
            &[Some(amy()), Some(Identity::with_handle("@bob")), None]
        );
    }

    #[test]
    fn join_place_into_full_or_missing_slot_is_absent() {
        let full = join_place(&create(None, None, 1, 1), 0, &amy()).expect("join");
        assert!(join_place(&full, 0, &Identity::with_handle("@bob")).is_none());
        assert!(join_place(&full, 5, &Identity::with_handle("@bob")).is_none());
    }

    #[test]
    fn leave_place_without_assignment_is_absent_and_leaves_board_untouched() {
        let board = join_place(&create(None, None, 2, 1), 1, &amy()).expect("join");
        let snapshot = board.clone();

        assert!(leave_place(&board, &Identity::with_handle("@bob")).is_none());
        assert_eq!(board, snapshot);
    }

    #[test]
    fn find_assignment_scans_slots_then_places_in_order() {
        let board = create(None, None, 3, 2);
        let board = join_place(&board, 2, &Identity::with_handle("@bob")).expect("join");
        let board = join_place(&board, 2, &amy()).expect("join");

        assert_eq!(find_assignment(&board, &amy()), Some(Assignment { slot: 2, place: 1 }));
        assert_eq!(find_assignment(&board, &Identity::with_handle("@eve")), None);
    }

    #[test]
    fn participants_with_same_display_name_are_the_same_assignment() {
        let first_john = Identity::with_display_name("John");
        let second_john = Identity::with_display_name("John");
        let board = join_place(&create(None, None, 2, 1), 0, &first_john).expect("join");

        assert_eq!(find_assignment(&board, &second_john), Some(Assignment { slot: 0, place: 0 }));
        assert_eq!(
            enter(&board, 1, &second_john),
            Err(TransitionRejected::AlreadyAssigned { slot: 0, place: 0 })
        );
    }

    #[test]
    fn handle_match_wins_over_different_display_names() {
        let stored =
            Identity::new(Some("@amy".to_owned()), Some("Amy".to_owned())).expect("identity");
        let renamed =
            Identity::new(Some("@amy".to_owned()), Some("Amelia".to_owned())).expect("identity");
        assert!(same_participant(&renamed, &stored));
        assert!(!same_participant(&Identity::with_handle("@bob"), &stored));
    }

    #[test]
    fn handle_only_participants_do_not_match_each_other() {
        assert!(!same_participant(&Identity::with_handle("@bob"), &amy()));
    }

    #[test]
    fn handleless_query_matches_legacy_undefined_handle() {
        let stored = Identity::new(Some(LEGACY_UNDEFINED_HANDLE.to_owned()), Some("Old".to_owned()))
            .expect("identity");
        let query = Identity::with_display_name("Someone Else");

        assert!(same_participant(&query, &stored));
        assert!(!same_participant(&stored, &query));
    }

    #[test]
    fn legacy_undefined_handle_matches_after_decoding_old_message() {
        let board = decode("Seats\n----------\n1 - @undefined (Ann)\n2 - вільно").expect("decode");
        let query = Identity::with_display_name("Ann");

        assert_eq!(find_assignment(&board, &query), Some(Assignment { slot: 0, place: 0 }));
        let left = leave_place(&board, &query).expect("leave");
        assert_eq!(left.slots()[0].places(), &[None]);
    }

    #[test]
    fn enter_reports_why_it_refused() {
        let board = create(None, None, 1, 1);
        let taken = enter(&board, 0, &amy()).expect("enter");

        assert_eq!(
            enter(&taken, 0, &Identity::with_handle("@bob")),
            Err(TransitionRejected::SlotFull { slot: 0 })
        );
        assert_eq!(
            enter(&taken, 3, &Identity::with_handle("@bob")),
            Err(TransitionRejected::UnknownSlot { slot: 3 })
        );
        assert_eq!(
            enter(&taken, 0, &amy()),
            Err(TransitionRejected::AlreadyAssigned { slot: 0, place: 0 })
        );
    }

    #[test]
    fn leave_reports_nothing_to_leave() {
        assert_eq!(leave(&create(None, None, 1, 1), &amy()), Err(TransitionRejected::NothingToLeave));
    }
}
