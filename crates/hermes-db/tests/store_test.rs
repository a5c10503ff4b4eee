/// Store-level tests against an in-memory SQLite database: friendship
/// symmetry and idempotent failure, the authorization predicate, and
/// conversation ordering/scoping.
use hermes_db::models::ProfileField;
use hermes_db::{Database, StoreError};

fn db_with_users(names: &[&str]) -> Database {
    let db = Database::open_in_memory().unwrap();
    for (i, name) in names.iter().enumerate() {
        db.create_user(&format!("id-{}", i), name, "argon2-hash").unwrap();
    }
    db
}

#[test]
fn duplicate_username_rejected() {
    let db = db_with_users(&["alice"]);
    let err = db.create_user("id-x", "alice", "other-hash").unwrap_err();
    assert!(matches!(err, StoreError::UsernameTaken(_)));
}

#[test]
fn usernames_are_case_sensitive() {
    let db = db_with_users(&["alice"]);
    assert!(db.get_user_by_username("alice").unwrap().is_some());
    assert!(db.get_user_by_username("Alice").unwrap().is_none());
}

#[test]
fn friendship_is_symmetric() {
    let db = db_with_users(&["alice", "bob"]);
    db.add_friendship("alice", "bob").unwrap();

    assert!(db.is_friend_of("alice", "bob").unwrap());
    assert!(db.is_friend_of("bob", "alice").unwrap());
    assert_eq!(db.friends_of("alice").unwrap(), vec!["bob".to_string()]);
    assert_eq!(db.friends_of("bob").unwrap(), vec!["alice".to_string()]);
}

#[test]
fn add_friend_twice_fails_and_changes_nothing() {
    let db = db_with_users(&["alice", "bob"]);
    db.add_friendship("alice", "bob").unwrap();

    let err = db.add_friendship("alice", "bob").unwrap_err();
    assert!(matches!(err, StoreError::AlreadyFriends));
    // The reversed direction hits the same relation
    let err = db.add_friendship("bob", "alice").unwrap_err();
    assert!(matches!(err, StoreError::AlreadyFriends));

    assert_eq!(db.friends_of("alice").unwrap().len(), 1);
    assert_eq!(db.friends_of("bob").unwrap().len(), 1);
}

#[test]
fn add_friend_requires_both_identities() {
    let db = db_with_users(&["alice"]);
    let err = db.add_friendship("alice", "ghost").unwrap_err();
    assert!(matches!(err, StoreError::UserNotFound(_)));
    let err = db.add_friendship("ghost", "alice").unwrap_err();
    assert!(matches!(err, StoreError::UserNotFound(_)));
    // Nothing half-applied
    assert!(db.friends_of("alice").unwrap().is_empty());
}

#[test]
fn self_friendship_rejected() {
    let db = db_with_users(&["alice"]);
    let err = db.add_friendship("alice", "alice").unwrap_err();
    assert!(matches!(err, StoreError::SelfFriend));
}

#[test]
fn authorization_predicate_distinguishes_sender_and_receiver() {
    let db = db_with_users(&["alice", "bob"]);

    // Unknown sender is an error, unknown receiver is just "not a friend"
    let err = db.is_friend_of("ghost", "alice").unwrap_err();
    assert!(matches!(err, StoreError::UserNotFound(_)));
    assert!(!db.is_friend_of("alice", "ghost").unwrap());
    assert!(!db.is_friend_of("alice", "bob").unwrap());
}

#[test]
fn conversation_is_ordered_and_scoped() {
    let db = db_with_users(&["alice", "bob", "carol"]);

    db.append_message("m1", "alice", "bob", "first", "2026-08-29T10:00:00+00:00")
        .unwrap();
    db.append_message("m2", "bob", "alice", "second", "2026-08-29T10:00:01+00:00")
        .unwrap();
    // Third party traffic must not leak into the pair's conversation
    db.append_message("m3", "alice", "carol", "other", "2026-08-29T10:00:02+00:00")
        .unwrap();
    db.append_message("m4", "alice", "bob", "third", "2026-08-29T10:00:03+00:00")
        .unwrap();

    let convo = db.conversation("alice", "bob").unwrap();
    let contents: Vec<&str> = convo.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["first", "second", "third"]);

    // Queried from either side the pair reads the same
    let reversed = db.conversation("bob", "alice").unwrap();
    assert_eq!(reversed.len(), 3);

    for pair in convo.windows(2) {
        assert!(pair[0].created_at <= pair[1].created_at);
    }
}

#[test]
fn conversation_ties_resolve_to_insertion_order() {
    let db = db_with_users(&["alice", "bob"]);
    let ts = "2026-08-29T12:00:00+00:00";
    db.append_message("m1", "alice", "bob", "one", ts).unwrap();
    db.append_message("m2", "bob", "alice", "two", ts).unwrap();

    let convo = db.conversation("alice", "bob").unwrap();
    let contents: Vec<&str> = convo.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["one", "two"]);
}

#[test]
fn profile_fields_roundtrip() {
    let db = db_with_users(&["alice"]);

    // Unset fields read back as empty strings
    assert_eq!(db.profile_field("alice", ProfileField::Bio).unwrap(), "");

    db.set_profile_field("alice", ProfileField::Bio, "hello").unwrap();
    db.set_profile_field("alice", ProfileField::Nickname, "al").unwrap();
    assert_eq!(db.profile_field("alice", ProfileField::Bio).unwrap(), "hello");
    assert_eq!(db.profile_field("alice", ProfileField::Nickname).unwrap(), "al");

    let err = db.set_profile_field("ghost", ProfileField::Bio, "x").unwrap_err();
    assert!(matches!(err, StoreError::UserNotFound(_)));
    let err = db.profile_field("ghost", ProfileField::Nickname).unwrap_err();
    assert!(matches!(err, StoreError::UserNotFound(_)));
}
