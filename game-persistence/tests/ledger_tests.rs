use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use game_core::{
    EligibilityGate, GameRng, GameRound, PlayError, PlayLedger, RecordStore, UserStateStore,
    build_admin_report,
};
use game_persistence::{SqlPlayLedger, connection::connect_to_memory_database};
use game_types::Player;
use migration::{Migrator, MigratorTrait};

async fn setup_ledger() -> Arc<SqlPlayLedger> {
    let db = connect_to_memory_database().await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    Arc::new(SqlPlayLedger::new(db))
}

fn player(uid: &str) -> Player {
    Player {
        uid: uid.to_string(),
        email: format!("{}@example.com", uid),
    }
}

fn utc(d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, d, h, min, 0).unwrap()
}

fn create_round(ledger: Arc<SqlPlayLedger>) -> GameRound<SqlPlayLedger, Utc> {
    GameRound::new(ledger, EligibilityGate::new(Utc), GameRng::new(42))
}

#[tokio::test]
async fn test_play_is_persisted() {
    let ledger = setup_ledger().await;
    let round = create_round(ledger.clone());
    let alice = player("alice");
    let now = utc(1, 10, 0);

    let outcome = round.play_at(&alice, now).await.unwrap();

    let records = ledger.query_by_user("alice").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].outcome(), outcome);
    assert_eq!(ledger.read("alice").await.unwrap(), Some(now));

    let profile = ledger.users().find_by_uid("alice").await.unwrap().unwrap();
    assert_eq!(profile.email, "alice@example.com");
    assert_eq!(profile.last_played, Some(now));
}

#[tokio::test]
async fn test_second_play_same_day_leaves_no_record() {
    let ledger = setup_ledger().await;
    let round = create_round(ledger.clone());
    let alice = player("alice");

    round.play_at(&alice, utc(1, 10, 0)).await.unwrap();
    let again = round.play_at(&alice, utc(1, 11, 0)).await;

    assert!(matches!(again, Err(PlayError::AlreadyPlayed)));
    assert_eq!(ledger.query_all().await.unwrap().len(), 1);

    round.play_at(&alice, utc(2, 0, 1)).await.unwrap();
    assert_eq!(ledger.query_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_stale_commit_writes_nothing() {
    let ledger = setup_ledger().await;
    let round = create_round(ledger.clone());
    let alice = player("alice");
    round.play_at(&alice, utc(1, 10, 0)).await.unwrap();

    let mut stale = ledger.query_all().await.unwrap().remove(0);
    stale.id = uuid::Uuid::new_v4();
    stale.played_at = utc(1, 10, 1);

    assert!(!ledger.commit_play(&stale, None).await.unwrap());
    assert_eq!(ledger.query_all().await.unwrap().len(), 1);
    assert_eq!(ledger.read("alice").await.unwrap(), Some(utc(1, 10, 0)));
}

#[tokio::test]
async fn test_failed_insert_rolls_back_claim() {
    let ledger = setup_ledger().await;
    let round = create_round(ledger.clone());
    let alice = player("alice");
    round.play_at(&alice, utc(1, 10, 0)).await.unwrap();

    // Reusing an existing record id makes the insert fail after the claim
    let mut duplicate = ledger.query_all().await.unwrap().remove(0);
    duplicate.played_at = utc(2, 9, 0);

    let result = ledger.commit_play(&duplicate, Some(utc(1, 10, 0))).await;
    assert!(result.is_err());
    assert_eq!(ledger.read("alice").await.unwrap(), Some(utc(1, 10, 0)));
    assert_eq!(ledger.query_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_plays_only_one_lands() {
    let ledger = setup_ledger().await;
    let round = create_round(ledger.clone());
    let alice = player("alice");
    let now = utc(1, 10, 0);

    let (a, b) = tokio::join!(round.play_at(&alice, now), round.play_at(&alice, now));

    assert!(a.is_ok() ^ b.is_ok());
    assert_eq!(ledger.query_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_admin_report_over_stored_plays() {
    let ledger = setup_ledger().await;
    let round = create_round(ledger.clone());

    round.play_at(&player("alice"), utc(1, 9, 0)).await.unwrap();
    round.play_at(&player("bob"), utc(1, 12, 0)).await.unwrap();
    round.play_at(&player("alice"), utc(2, 9, 0)).await.unwrap();

    let records = ledger.query_all().await.unwrap();
    let wins = records.iter().filter(|r| r.won).count() as u32;
    let report = build_admin_report(records, &Utc);

    assert_eq!(report.summary.total_plays, 3);
    assert_eq!(report.summary.total_wins, wins);
    assert_eq!(report.days.len(), 2);
    assert_eq!(report.days[0].results.len(), 1);
    assert_eq!(report.days[1].results.len(), 2);
}
