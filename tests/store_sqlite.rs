// tests/store_sqlite.rs
use chrono::{Duration, TimeZone, Utc};
use gearnews::store::{NewItem, NewSource, SqliteStore, Store, UpsertOutcome};

fn item(source_id: i64, url: &str, hours_ago: Option<i64>) -> NewItem {
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
    NewItem {
        source_id,
        title: format!("title for {url}"),
        url: url.to_string(),
        guid: Some(format!("guid:{url}")),
        published_at: hours_ago.map(|h| now - Duration::hours(h)),
        summary: Some("snippet".into()),
        author: None,
        tags: vec![],
    }
}

#[tokio::test]
async fn insert_is_if_absent_on_url() {
    let store = SqliteStore::in_memory().await.expect("sqlite memory");

    let first = store
        .insert_items(&[item(1, "https://x/a", Some(1)), item(1, "https://x/b", Some(2))])
        .await
        .unwrap();
    assert_eq!(first, UpsertOutcome { attempted: 2, inserted: 2 });

    let mut changed = item(2, "https://x/a", Some(50));
    changed.title = "rewritten".into();
    let second = store
        .insert_items(&[changed, item(2, "https://x/c", None)])
        .await
        .unwrap();
    assert_eq!(second, UpsertOutcome { attempted: 2, inserted: 1 });

    let rows = store.recent_items(10, None).await.unwrap();
    assert_eq!(rows.len(), 3);
    let a = rows.iter().find(|r| r.url == "https://x/a").unwrap();
    assert_eq!(a.title, "title for https://x/a");
    assert_eq!(a.source_id, Some(1));
    assert!(a.tags.is_empty());
}

#[tokio::test]
async fn items_since_orders_newest_first_and_skips_undated() {
    let store = SqliteStore::in_memory().await.unwrap();
    store
        .insert_items(&[
            item(1, "https://x/old", Some(24 * 10)),
            item(1, "https://x/mid", Some(30)),
            item(1, "https://x/new", Some(2)),
            item(1, "https://x/undated", None),
        ])
        .await
        .unwrap();

    let cutoff = Utc.with_ymd_and_hms(2026, 10, 12, 12, 0, 0).unwrap();
    let rows = store.items_since(cutoff, 120).await.unwrap();
    let urls: Vec<&str> = rows.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["https://x/new", "https://x/mid"]);

    let limited = store.items_since(cutoff, 1).await.unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].url, "https://x/new");
}

#[tokio::test]
async fn recent_items_filters_by_source_and_puts_undated_last() {
    let store = SqliteStore::in_memory().await.unwrap();
    store
        .insert_items(&[
            item(1, "https://one/undated", None),
            item(1, "https://one/a", Some(5)),
            item(2, "https://two/a", Some(1)),
        ])
        .await
        .unwrap();

    let all: Vec<String> = store
        .recent_items(60, None)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.url)
        .collect();
    assert_eq!(all, vec!["https://two/a", "https://one/a", "https://one/undated"]);

    let one = store.recent_items(60, Some(1)).await.unwrap();
    assert_eq!(one.len(), 2);
    assert!(one.iter().all(|r| r.source_id == Some(1)));
}

#[tokio::test]
async fn sources_upsert_by_url_and_list_by_name() {
    let store = SqliteStore::in_memory().await.unwrap();
    for (name, url, enabled) in [
        ("Zed Guitars", "https://zed/feed", true),
        ("Amp Hub", "https://amphub/feed", true),
        ("Old Name", "https://mic/feed", true),
    ] {
        store
            .upsert_source(&NewSource {
                name: name.into(),
                url: url.into(),
                enabled,
            })
            .await
            .unwrap();
    }
    store
        .upsert_source(&NewSource {
            name: "Mic World".into(),
            url: "https://mic/feed".into(),
            enabled: false,
        })
        .await
        .unwrap();

    let names: Vec<String> = store
        .list_sources()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["Amp Hub", "Mic World", "Zed Guitars"]);

    let enabled: Vec<String> = store
        .enabled_sources()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(enabled, vec!["Zed Guitars", "Amp Hub"]);
}

#[tokio::test]
async fn file_database_is_created_and_reopened() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("news.db").display());

    {
        let store = SqliteStore::connect(&url).await.expect("create db");
        store.insert_items(&[item(1, "https://x/a", Some(1))]).await.unwrap();
        store.pool().close().await;
    }

    let store = SqliteStore::connect(&url).await.expect("reopen db");
    let again = store.insert_items(&[item(1, "https://x/a", Some(1))]).await.unwrap();
    assert_eq!(again.inserted, 0);
    assert_eq!(store.recent_items(10, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_batches_sharing_a_url_keep_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("race.db").display());

    // two independent pools on the same file, like two import runs
    let left = SqliteStore::connect(&url).await.expect("open left");
    let right = SqliteStore::connect(&url).await.expect("open right");

    for round in 0..5 {
        let shared = format!("https://x/shared-{round}");
        let a = vec![item(1, &shared, Some(1)), item(1, &format!("https://x/left-{round}"), Some(2))];
        let b = vec![item(2, &shared, Some(3)), item(2, &format!("https://x/right-{round}"), Some(4))];

        let (ra, rb) = tokio::join!(left.insert_items(&a), right.insert_items(&b));
        let (ra, rb) = (ra.expect("left batch"), rb.expect("right batch"));

        assert_eq!(ra.attempted + rb.attempted, 4);
        // each batch's own url lands, the shared one exactly once
        assert_eq!(ra.inserted + rb.inserted, 3, "round {round}");
    }

    let rows = left.recent_items(100, None).await.unwrap();
    assert_eq!(rows.len(), 15);
    for round in 0..5 {
        let shared = format!("https://x/shared-{round}");
        assert_eq!(rows.iter().filter(|r| r.url == shared).count(), 1);
    }
}
