use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use common::{Direction, Idea, SignalRecord};
use store::{MemoryStore, SignalBook};

fn idea(symbol: &str, score: u32) -> Idea {
    Idea {
        symbol: symbol.to_string(),
        direction: Direction::Long,
        entry_price: 100.0,
        stop_loss: 99.0,
        take_profit: 102.0,
        risk_reward_ratio: 2.0,
        confluence_score: score,
        note_tags: vec!["BOS up".to_string()],
    }
}

fn record(symbol: &str, score: u32, minute: i64) -> SignalRecord {
    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    SignalRecord { idea: idea(symbol, score), announced_at: t0 + Duration::minutes(minute) }
}

fn book(history_limit: usize) -> SignalBook {
    SignalBook::new(Arc::new(MemoryStore::new()), history_limit)
}

#[tokio::test]
async fn record_announcement_sets_last_and_appends_history() {
    let book = book(10);
    book.record_announcement(&record("BTCUSDT", 9, 0)).await.unwrap();
    book.record_announcement(&record("ETHUSDT", 7, 1)).await.unwrap();
    book.record_announcement(&record("BTCUSDT", 10, 2)).await.unwrap();

    let last = book.last_signal("BTCUSDT").await.unwrap().unwrap();
    assert_eq!(last.idea.confluence_score, 10);

    let history = book.history(10).await.unwrap();
    let scores: Vec<u32> = history.iter().map(|r| r.idea.confluence_score).collect();
    assert_eq!(scores, vec![10, 7, 9], "newest first");
}

#[tokio::test]
async fn refresh_does_not_touch_history() {
    let book = book(10);
    book.record_announcement(&record("BTCUSDT", 9, 0)).await.unwrap();
    book.set_last_signal(&record("BTCUSDT", 9, 11)).await.unwrap();

    assert_eq!(book.history(10).await.unwrap().len(), 1);
    let last = book.last_signal("BTCUSDT").await.unwrap().unwrap();
    assert_eq!(last.announced_at, record("BTCUSDT", 9, 11).announced_at);
}

#[tokio::test]
async fn history_is_bounded_oldest_first_out() {
    let book = book(3);
    for minute in 0..5 {
        book.record_announcement(&record("BTCUSDT", minute as u32, minute)).await.unwrap();
    }
    let scores: Vec<u32> = book
        .history(10)
        .await
        .unwrap()
        .iter()
        .map(|r| r.idea.confluence_score)
        .collect();
    assert_eq!(scores, vec![4, 3, 2]);
}

#[tokio::test]
async fn watch_and_unwatch() {
    let book = book(10);
    assert!(book.watch(7, "BTCUSDT").await.unwrap());
    assert!(!book.watch(7, "BTCUSDT").await.unwrap());
    assert!(book.watch(7, "ETHUSDT").await.unwrap());
    assert!(book.watch(8, "SOLUSDT").await.unwrap());

    assert_eq!(book.watchlist(7).await.unwrap(), vec!["BTCUSDT", "ETHUSDT"]);

    assert!(book.unwatch(7, "BTCUSDT").await.unwrap());
    assert!(!book.unwatch(7, "BTCUSDT").await.unwrap());
    assert!(book.unwatch(8, "SOLUSDT").await.unwrap());

    let lists = book.watchlists().await.unwrap();
    assert_eq!(lists.len(), 1, "empty watchlists are dropped");
    assert_eq!(lists[&7], vec!["ETHUSDT"]);
}

#[tokio::test]
async fn grant_and_revoke() {
    let book = book(10);
    assert!(book.grant(42).await.unwrap());
    assert!(!book.grant(42).await.unwrap());
    assert!(book.is_granted(42).await.unwrap());

    assert!(book.revoke(42).await.unwrap());
    assert!(!book.revoke(42).await.unwrap());
    assert!(book.granted().await.unwrap().is_empty());
}

#[tokio::test]
async fn revoke_drops_the_watchlist() {
    let book = book(10);
    book.grant(7).await.unwrap();
    book.watch(7, "XRPUSDT").await.unwrap();
    book.watch(8, "BTCUSDT").await.unwrap();

    assert!(book.revoke(7).await.unwrap());

    assert!(book.watchlist(7).await.unwrap().is_empty());
    assert_eq!(book.watchlist(8).await.unwrap(), vec!["BTCUSDT"]);
}

#[tokio::test]
async fn concurrent_grants_are_not_lost() {
    let book = book(10);
    let tasks: Vec<_> = (0..20)
        .map(|id| {
            let book = book.clone();
            tokio::spawn(async move { book.grant(id).await.unwrap() })
        })
        .collect();
    for t in tasks {
        assert!(t.await.unwrap());
    }
    assert_eq!(book.granted().await.unwrap().len(), 20);
}
