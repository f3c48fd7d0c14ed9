use chrono::{NaiveDate, TimeZone, Utc};
use studycycle::{compute_stats, SessionStore, SessionType, SqliteStore, StudyRecord};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn record(
    id: &str,
    user_id: &str,
    subject: &str,
    minutes: f64,
    session_type: SessionType,
    timestamp: chrono::DateTime<Utc>,
) -> StudyRecord {
    StudyRecord {
        id: id.into(),
        user_id: user_id.into(),
        subject: subject.into(),
        duration_minutes: minutes,
        session_type,
        timestamp,
    }
}

#[tokio::test]
async fn append_and_query_are_scoped_per_user() {
    init_logging();

    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::new(dir.path().join("study.db")).unwrap();

    let ts = Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap();
    store
        .append(&record("a", "alice", "Math", 25.0, SessionType::Pomodoro, ts))
        .await
        .unwrap();
    store
        .append(&record(
            "b",
            "alice",
            "Math",
            5.0,
            SessionType::ShortBreak,
            ts + chrono::Duration::minutes(30),
        ))
        .await
        .unwrap();
    store
        .append(&record("c", "bob", "History", 15.0, SessionType::LongBreak, ts))
        .await
        .unwrap();

    let mut alice = store.query("alice").await.unwrap();
    alice.sort_by(|x, y| x.id.cmp(&y.id));
    assert_eq!(alice.len(), 2);
    assert_eq!(alice[0].subject, "Math");
    assert_eq!(alice[0].session_type, SessionType::Pomodoro);
    assert_eq!(alice[0].duration_minutes, 25.0);
    assert_eq!(alice[0].timestamp, ts);
    assert_eq!(alice[1].session_type, SessionType::ShortBreak);

    let bob = store.query("bob").await.unwrap();
    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].session_type, SessionType::LongBreak);

    assert!(store.query("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn retried_append_is_idempotent_per_record_id() {
    init_logging();

    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::new(dir.path().join("study.db")).unwrap();

    let ts = Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap();
    let rec = record("a", "alice", "Math", 25.0, SessionType::Pomodoro, ts);
    store.append(&rec).await.unwrap();
    store.append(&rec).await.unwrap();

    assert_eq!(store.query("alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn negative_duration_is_rejected_at_ingestion() {
    init_logging();

    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::new(dir.path().join("study.db")).unwrap();

    let ts = Utc::now();
    let bad = record("a", "alice", "Math", -1.0, SessionType::Pomodoro, ts);
    assert!(store.append(&bad).await.is_err());
    assert!(store.query("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn store_reopens_with_existing_records() {
    init_logging();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("study.db");

    let ts = Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap();
    {
        let store = SqliteStore::new(path.clone()).unwrap();
        store
            .append(&record("a", "alice", "Math", 25.0, SessionType::Pomodoro, ts))
            .await
            .unwrap();
    }

    let reopened = SqliteStore::new(path).unwrap();
    let records = reopened.query("alice").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].timestamp, ts);
}

#[tokio::test]
async fn queried_snapshot_feeds_the_aggregator() {
    init_logging();

    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::new(dir.path().join("study.db")).unwrap();

    let as_of = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
    let today = Utc.from_utc_datetime(&as_of.and_hms_opt(9, 0, 0).unwrap());
    let yesterday = today - chrono::Duration::days(1);

    store
        .append(&record("a", "alice", "Math", 25.0, SessionType::Pomodoro, today))
        .await
        .unwrap();
    store
        .append(&record("b", "alice", "Math", 30.0, SessionType::Pomodoro, yesterday))
        .await
        .unwrap();

    let records = store.query("alice").await.unwrap();
    let stats = compute_stats(&records, as_of, &Utc);

    assert_eq!(stats.total_time_minutes, 55.0);
    assert_eq!(stats.subject_totals["Math"], 55.0);
    assert_eq!(stats.daily_average_minutes, 27.5);
    assert_eq!(stats.streak_days, 2);

    // Same snapshot, same answer.
    assert_eq!(compute_stats(&records, as_of, &Utc), stats);
}
