mod common;

use common::{at, noon, stored, Harness, ScriptedStore, WALLET};
use noospace_core::{
    count_today, day_key, EngineConfig, EngineError, EntryInput, Identity, StaticIdentityProvider,
};

fn wallet() -> Identity {
    Identity::Wallet(WALLET.to_string())
}

fn attached(store: ScriptedStore, provider: StaticIdentityProvider) -> Harness {
    let mut harness = Harness::with_store(store, provider, EngineConfig::default());
    harness.engine.attach().unwrap();
    harness
}

#[test]
fn fifth_submission_of_the_day_is_the_last_one() {
    let seeded = (0..4)
        .map(|idx| stored(wallet(), &format!("seed {idx}"), &["x"], at(0, 2026, 5, 2, 8)))
        .collect();
    let mut harness = attached(
        ScriptedStore::seeded(seeded),
        StaticIdentityProvider::connected(WALLET),
    );
    assert_eq!(harness.engine.count_today(), 4);
    assert_eq!(harness.engine.remaining_today(), 1);

    harness.engine.submit(&EntryInput::new("fifth")).unwrap();
    assert_eq!(harness.engine.remaining_today(), 0);

    let err = harness.engine.submit(&EntryInput::new("sixth")).unwrap_err();
    assert!(matches!(err, EngineError::QuotaExceeded { limit: 5, .. }));
    assert_eq!(harness.inserts(), 1);
    assert_eq!(
        harness.engine.last_error(),
        Some("You've reached today's ritual limit. Return tomorrow.")
    );
}

#[test]
fn five_entries_today_block_the_next_submission() {
    let seeded = (0..5)
        .map(|idx| stored(wallet(), &format!("seed {idx}"), &["x"], at(0, 2026, 5, 2, 9)))
        .collect();
    let mut harness = attached(
        ScriptedStore::seeded(seeded),
        StaticIdentityProvider::connected(WALLET),
    );

    let err = harness.engine.submit(&EntryInput::new("blocked")).unwrap_err();

    assert!(matches!(err, EngineError::QuotaExceeded { .. }));
    assert_eq!(harness.inserts(), 0);
}

#[test]
fn yesterday_and_other_owners_do_not_count() {
    let mut seeded = vec![
        stored(wallet(), "yesterday", &["x"], at(0, 2026, 5, 1, 23)),
        stored(Identity::Guest, "guest today", &["x"], at(0, 2026, 5, 2, 1)),
    ];
    seeded.extend((0..4).map(|idx| {
        stored(
            Identity::Wallet("someone-else".to_string()),
            &format!("other {idx}"),
            &["x"],
            at(0, 2026, 5, 2, 2),
        )
    }));
    let harness = attached(
        ScriptedStore::seeded(seeded),
        StaticIdentityProvider::connected(WALLET),
    );

    assert_eq!(harness.engine.count_today(), 0);
    assert_eq!(harness.engine.remaining_today(), 5);
}

#[test]
fn all_guests_share_one_daily_bucket() {
    let seeded = (0..5)
        .map(|idx| {
            stored(
                Identity::Guest,
                &format!("another device {idx}"),
                &["x"],
                at(0, 2026, 5, 2, 6),
            )
        })
        .collect();
    let mut harness = attached(
        ScriptedStore::seeded(seeded),
        StaticIdentityProvider::unavailable(),
    );

    assert_eq!(harness.engine.count_today(), 5);
    let err = harness.engine.submit(&EntryInput::new("me too")).unwrap_err();
    assert!(matches!(
        err,
        EngineError::QuotaExceeded {
            identity: Identity::Guest,
            ..
        }
    ));
}

#[test]
fn day_key_is_local_but_timestamps_are_utc() {
    // 01:00 local at UTC+3 is 22:00 UTC the previous day.
    let local_morning = at(3, 2026, 5, 2, 1);
    let entry = stored(wallet(), "early", &["x"], local_morning);

    assert_eq!(day_key(&local_morning), "2026-05-02");
    assert!(entry.created_at_iso().starts_with("2026-05-01"));
    assert_eq!(count_today(&wallet(), [&entry], &local_morning), 0);
    assert_eq!(count_today(&wallet(), [&entry], &noon()), 0);
    assert_eq!(count_today(&wallet(), [&entry], &at(0, 2026, 5, 1, 23)), 1);
}

#[test]
fn custom_daily_limit_is_honoured() {
    let config = EngineConfig::from_toml_str("daily_limit = 2").unwrap();
    let mut harness = Harness::new(StaticIdentityProvider::unavailable(), config);
    harness.engine.attach().unwrap();

    harness.engine.submit(&EntryInput::new("one")).unwrap();
    harness.engine.submit(&EntryInput::new("two")).unwrap();
    let err = harness.engine.submit(&EntryInput::new("three")).unwrap_err();

    assert!(matches!(err, EngineError::QuotaExceeded { limit: 2, .. }));
}
