//! Integration tests for the room session engine with a recording bus.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use platepick::prelude::*;
use platepick::{INVALID_VOTE_MESSAGE, NO_SELECTION_MESSAGE, UNANIMOUS_EXPLANATION};
use serde_json::json;

// =========================================================================
// Test doubles
// =========================================================================

/// Remembers every publish; can be told to fail or to stall.
#[derive(Default)]
struct RecordingBus {
    published: Mutex<Vec<(String, RoomEvent)>>,
    failing: bool,
    /// Publishing an `Update` whose only suggestion is this name sleeps first.
    stall_on: Option<String>,
}

impl RecordingBus {
    fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    fn stalling_on(name: &str) -> Self {
        Self {
            stall_on: Some(name.to_string()),
            ..Self::default()
        }
    }

    fn published(&self) -> Vec<(String, RoomEvent)> {
        self.published.lock().unwrap().clone()
    }
}

impl MessageBus for RecordingBus {
    async fn publish(&self, topic: &str, event: RoomEvent) -> Result<usize, BusError> {
        if self.failing {
            return Err(BusError::Unavailable("test bus down".into()));
        }
        if let (Some(name), RoomEvent::Update { suggestions, .. }) = (&self.stall_on, &event) {
            if suggestions.as_slice() == [name.clone()] {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
        self.published.lock().unwrap().push((topic.to_string(), event));
        Ok(1)
    }
}

/// Always answers with the same lines.
struct MockAi(Vec<String>);

impl MockAi {
    fn new(lines: &[&str]) -> Self {
        Self(lines.iter().map(|l| l.to_string()).collect())
    }
}

impl SuggestionProvider for MockAi {
    async fn suggest(&self, _prompt: &str) -> Result<Vec<String>, SuggestError> {
        Ok(self.0.clone())
    }
}

type Session = RoomSession<MockAi, RecordingBus>;

struct Fixture {
    session: Arc<Session>,
    bus: Arc<RecordingBus>,
    code: String,
    room_id: RoomId,
}

fn fixture_with(ai: MockAi, bus: RecordingBus) -> Fixture {
    let directory = InMemoryDirectory::new();
    directory.insert(UserId(1), "alice");
    directory.insert(UserId(2), "bob");
    directory.insert(UserId(3), "carol");

    let bus = Arc::new(bus);
    let session = RoomSession::new(
        Arc::new(RoomRegistry::new()),
        Arc::new(ai),
        Arc::new(directory),
        Arc::clone(&bus),
    );
    let room = session.create_room(UserId(1)).unwrap();
    Fixture {
        session: Arc::new(session),
        bus,
        code: room.invite_code.as_str().to_string(),
        room_id: room.id,
    }
}

fn fixture() -> Fixture {
    fixture_with(MockAi::new(&["Udon House", "Pho 99"]), RecordingBus::default())
}

fn join(user: serde_json::Value) -> ClientAction {
    ClientAction::Join { user }
}

fn suggest(name: &str) -> ClientAction {
    ClientAction::Suggest {
        name: name.to_string(),
    }
}

fn error(message: &str) -> RoomEvent {
    RoomEvent::error(message)
}

// =========================================================================
// Membership
// =========================================================================

#[tokio::test]
async fn test_join_broadcasts_update_on_room_topic() {
    let f = fixture();
    let events = f.session.handle(&f.code, join(json!(2))).await;

    let expected = RoomEvent::Update {
        participant_count: 2,
        ready: false,
        participants: vec!["alice".into(), "bob".into()],
        suggestions: vec![],
    };
    assert_eq!(events, vec![expected.clone()]);
    assert_eq!(f.bus.published(), vec![(room_topic(&f.code), expected)]);
}

#[tokio::test]
async fn test_join_accepts_legacy_identity_shapes() {
    let f = fixture();
    f.session.handle(&f.code, join(json!("user-2"))).await;
    f.session.handle(&f.code, join(json!([51]))).await; // b"3"

    let room = f.session.registry().find_by_id(f.room_id).unwrap();
    assert_eq!(room.participant_names(), vec!["alice", "bob", "carol"]);
}

#[tokio::test]
async fn test_join_twice_or_unknown_changes_nothing_but_still_updates() {
    let f = fixture();
    f.session.handle(&f.code, join(json!(2))).await;
    let again = f.session.handle(&f.code, join(json!(2))).await;
    let unknown = f.session.handle(&f.code, join(json!(99))).await;
    let nobody = f.session.handle(&f.code, join(json!("no digits"))).await;

    for events in [again, unknown, nobody] {
        assert!(matches!(
            events.as_slice(),
            [RoomEvent::Update { participant_count: 2, .. }]
        ));
    }
}

#[tokio::test]
async fn test_leave_broadcasts_without_removing() {
    let f = fixture();
    f.session.handle(&f.code, join(json!(2))).await;
    let events = f
        .session
        .handle(&f.code, ClientAction::Leave { user: json!(2) })
        .await;

    assert!(matches!(
        events.as_slice(),
        [RoomEvent::Update { participant_count: 2, .. }]
    ));
}

#[tokio::test]
async fn test_malformed_vote_for_unknown_room_is_a_format_error() {
    let f = fixture();
    let events = f.session.handle("NOPE42", suggest("VOTE:Tacos:alice")).await;

    assert_eq!(events, vec![error(INVALID_VOTE_MESSAGE)]);
    assert_eq!(
        f.bus.published(),
        vec![("room.NOPE42".to_string(), error(INVALID_VOTE_MESSAGE))]
    );
}

#[tokio::test]
async fn test_unknown_room_errors_on_its_topic() {
    let f = fixture();
    let events = f.session.handle("NOPE42", suggest("Tacos")).await;

    let expected = error("Room not found with invite code: NOPE42");
    assert_eq!(events, vec![expected.clone()]);
    assert_eq!(f.bus.published(), vec![("room.NOPE42".to_string(), expected)]);
}

// =========================================================================
// Suggestions
// =========================================================================

#[tokio::test]
async fn test_suggestions_are_trimmed_and_idempotent() {
    let f = fixture();
    f.session.handle(&f.code, suggest("  Tacos  ")).await;
    let events = f.session.handle(&f.code, suggest("Tacos")).await;

    match events.as_slice() {
        [RoomEvent::Update { suggestions, .. }] => assert_eq!(suggestions, &vec!["Tacos".to_string()]),
        other => panic!("unexpected events: {other:?}"),
    }
    assert_eq!(f.bus.published().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_updates_reach_the_bus_in_registry_order() {
    let f = fixture_with(MockAi::new(&[]), RecordingBus::stalling_on("X"));

    let first = {
        let session = Arc::clone(&f.session);
        let code = f.code.clone();
        tokio::spawn(async move { session.handle(&code, suggest("X")).await })
    };
    // let the first action reach its stalled publish
    tokio::time::sleep(Duration::from_millis(20)).await;
    f.session.handle(&f.code, suggest("Y")).await;
    first.await.unwrap();

    let updates: Vec<Vec<String>> = f
        .bus
        .published()
        .into_iter()
        .filter_map(|(_, event)| match event {
            RoomEvent::Update { suggestions, .. } => Some(suggestions),
            _ => None,
        })
        .collect();
    assert_eq!(
        updates,
        vec![vec!["X".to_string()], vec!["X".to_string(), "Y".to_string()]]
    );

    let room = f.session.registry().find_by_id(f.room_id).unwrap();
    assert_eq!(updates.last(), Some(&room.suggestions));
}

#[tokio::test]
async fn test_ai_suggest_adds_and_updates() {
    let f = fixture();
    f.session.handle(&f.code, suggest("Pho 99")).await;
    let events = f
        .session
        .handle(
            &f.code,
            ClientAction::AiSuggest {
                prompt: "noodles".into(),
            },
        )
        .await;

    match events.as_slice() {
        [RoomEvent::Update { suggestions, .. }] => {
            assert_eq!(suggestions, &vec!["Pho 99".to_string(), "Udon House".to_string()])
        }
        other => panic!("unexpected events: {other:?}"),
    }
}

// =========================================================================
// Voting rounds
// =========================================================================

#[tokio::test]
async fn test_start_vote_resets_ballots() {
    let f = fixture();
    f.session.handle(&f.code, suggest("VOTE:Tacos:alice:true")).await;
    f.session.handle(&f.code, join(json!(2))).await;

    let events = f
        .session
        .handle(
            &f.code,
            ClientAction::StartVote {
                candidate: "Tacos".into(),
            },
        )
        .await;

    assert_eq!(
        events,
        vec![RoomEvent::VoteUpdate {
            room_code: InviteCode::from(f.code.as_str()),
            candidate: "Tacos".into(),
            votes: VoteSnapshot::new(),
        }]
    );
    assert!(f.session.ledger().votes(&f.code, "Tacos").is_empty());
    assert_eq!(f.session.round(&f.code), VoteRound::Voting("Tacos".into()));
}

#[tokio::test]
async fn test_unanimous_approval_selects_and_clears() {
    let f = fixture();
    f.session.handle(&f.code, join(json!(2))).await;

    let first = f.session.handle(&f.code, suggest("VOTE:Tacos:alice:true")).await;
    assert_eq!(first.len(), 1);
    assert_eq!(f.session.round(&f.code), VoteRound::Voting("Tacos".into()));

    let second = f.session.handle(&f.code, suggest("VOTE:Tacos:bob:TRUE")).await;
    let expected_votes: VoteSnapshot =
        [("alice".to_string(), true), ("bob".to_string(), true)].into();
    assert_eq!(
        second,
        vec![
            RoomEvent::VoteUpdate {
                room_code: InviteCode::from(f.code.as_str()),
                candidate: "Tacos".into(),
                votes: expected_votes,
            },
            RoomEvent::Selection {
                candidate: "Tacos".into(),
                explanation: UNANIMOUS_EXPLANATION.into(),
                room_code: InviteCode::from(f.code.as_str()),
            },
        ]
    );
    assert!(f.session.ledger().votes(&f.code, "Tacos").is_empty());
    assert_eq!(f.session.round(&f.code), VoteRound::Idle);
}

#[tokio::test]
async fn test_rejection_errors_and_clears() {
    let f = fixture();
    f.session.handle(&f.code, join(json!(2))).await;

    f.session.handle(&f.code, suggest("VOTE:Tacos:alice:true")).await;
    let events = f.session.handle(&f.code, suggest("VOTE:Tacos:bob:nope")).await;

    assert_eq!(events.len(), 2);
    assert_eq!(events[1], error("Restaurant 'Tacos' was not unanimously approved"));
    assert!(f.session.ledger().votes(&f.code, "Tacos").is_empty());
    assert_eq!(f.session.round(&f.code), VoteRound::Idle);
}

#[tokio::test]
async fn test_vote_overwrite_does_not_resolve_early() {
    let f = fixture();
    f.session.handle(&f.code, join(json!(2))).await;

    f.session.handle(&f.code, suggest("VOTE:Tacos:alice:false")).await;
    let events = f.session.handle(&f.code, suggest("VOTE:Tacos:alice:true")).await;

    assert_eq!(events.len(), 1);
    let votes = f.session.ledger().votes(&f.code, "Tacos");
    assert_eq!(votes.len(), 1);
    assert_eq!(votes.get("alice"), Some(&true));
}

#[tokio::test]
async fn test_resolving_another_candidate_keeps_open_round() {
    let f = fixture();
    f.session.handle(&f.code, join(json!(2))).await;
    f.session
        .handle(
            &f.code,
            ClientAction::StartVote {
                candidate: "Tacos".into(),
            },
        )
        .await;

    f.session.handle(&f.code, suggest("VOTE:Ramen:alice:true")).await;
    let events = f.session.handle(&f.code, suggest("VOTE:Ramen:bob:true")).await;
    assert!(matches!(events.last(), Some(RoomEvent::Selection { candidate, .. }) if candidate == "Ramen"));
    assert_eq!(f.session.round(&f.code), VoteRound::Voting("Tacos".into()));

    f.session.handle(&f.code, suggest("VOTE:Tacos:alice:true")).await;
    f.session.handle(&f.code, suggest("VOTE:Tacos:bob:false")).await;
    assert_eq!(f.session.round(&f.code), VoteRound::Idle);
}

#[tokio::test]
async fn test_malformed_vote_leaves_ledger_untouched() {
    let f = fixture();
    f.session.handle(&f.code, join(json!(2))).await;
    f.session.handle(&f.code, suggest("VOTE:Tacos:alice:true")).await;

    for raw in ["VOTE:Tacos:bob", "VOTE:Tacos:bob:true:extra", "VOTE:"] {
        let events = f.session.handle(&f.code, suggest(raw)).await;
        assert_eq!(events, vec![error(INVALID_VOTE_MESSAGE)]);
    }

    let votes = f.session.ledger().votes(&f.code, "Tacos");
    assert_eq!(votes.len(), 1);
    // Ballots never become suggestions.
    let room = f.session.registry().find_by_id(f.room_id).unwrap();
    assert!(room.suggestions.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_final_votes_resolve_once() {
    let directory = InMemoryDirectory::new();
    for id in 1..=8 {
        directory.insert(UserId(id), format!("user{id}"));
    }
    let bus = Arc::new(RecordingBus::default());
    let session = Arc::new(RoomSession::new(
        Arc::new(RoomRegistry::new()),
        Arc::new(MockAi::new(&[])),
        Arc::new(directory),
        Arc::clone(&bus),
    ));
    let code = session.create_room(UserId(1)).unwrap().invite_code.as_str().to_string();
    for id in 2..=8 {
        session.handle(&code, join(json!(id))).await;
    }

    let mut handles = Vec::new();
    for id in 1..=8 {
        let session = Arc::clone(&session);
        let code = code.clone();
        handles.push(tokio::spawn(async move {
            session
                .handle(&code, suggest(&format!("VOTE:Sushi:user{id}:true")))
                .await
        }));
    }

    let mut selections = 0;
    for h in handles {
        selections += h
            .await
            .unwrap()
            .iter()
            .filter(|e| matches!(e, RoomEvent::Selection { .. }))
            .count();
    }
    assert_eq!(selections, 1);
    assert!(session.ledger().votes(&code, "Sushi").is_empty());
}

// =========================================================================
// Selection
// =========================================================================

#[tokio::test]
async fn test_select_without_suggestions_errors() {
    let f = fixture();
    for strategy in SelectionStrategy::ALL {
        let events = f
            .session
            .handle(&f.code, ClientAction::SelectRestaurant { strategy })
            .await;
        assert_eq!(events, vec![error(NO_SELECTION_MESSAGE)]);
    }
}

#[tokio::test]
async fn test_select_highest_votes_uses_counter() {
    let f = fixture();
    f.session.handle(&f.code, suggest("Tacos")).await;
    f.session.handle(&f.code, suggest("Ramen")).await;
    assert_eq!(f.session.cast_vote(f.room_id, "Ramen").unwrap(), 1);
    assert_eq!(f.session.best(f.room_id).as_deref(), Some("Ramen"));

    let events = f
        .session
        .handle(
            &f.code,
            ClientAction::SelectRestaurant {
                strategy: SelectionStrategy::HighestVotes,
            },
        )
        .await;
    assert_eq!(
        events,
        vec![RoomEvent::Selection {
            candidate: "Ramen".into(),
            explanation: "Selected based on highest number of votes".into(),
            room_code: InviteCode::from(f.code.as_str()),
        }]
    );
}

#[tokio::test]
async fn test_cast_vote_errors() {
    let f = fixture();
    let err = f.session.cast_vote(f.room_id, "Nothing").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = f.session.cast_vote(RoomId(999), "Tacos").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_create_room_requires_known_user() {
    let f = fixture();
    let err = f.session.create_room(UserId(42)).unwrap_err();
    assert!(matches!(err, PlatepickError::UnknownUser(UserId(42))));
}

// =========================================================================
// Bus failures
// =========================================================================

#[tokio::test]
async fn test_publish_failure_still_applies_action() {
    let f = fixture_with(MockAi::new(&[]), RecordingBus::failing());
    let events = f.session.handle(&f.code, suggest("Tacos")).await;

    assert_eq!(events.len(), 1);
    let room = f.session.registry().find_by_id(f.room_id).unwrap();
    assert_eq!(room.suggestions, vec!["Tacos"]);
}
