//! Item use-case tests.

mod common;

use common::TestApp;
use leaflet_app::AppError;
use leaflet_core::{Item, Page, Policy, Tag, TagList};
use std::collections::HashSet;
use time::Duration;

fn tagged(content: &str, tags: &[(&str, &str)]) -> Item {
    let mut item = Item::new(content);
    item.tags = tags.iter().copied().collect();
    item
}

#[tokio::test]
async fn test_create_item_renders_and_touches_page() {
    let env = TestApp::new().await;
    let alice = env.user_with_page("alice", "blog", Policy::Private).await;
    let before = alice.get_page("alice", "blog").await.unwrap();

    let item = alice
        .create_item("alice", "blog", Item::new("# Hello\n<script>x()</script>"))
        .await
        .unwrap();

    assert_eq!(item.id.len(), leaflet_core::ID_LENGTH);
    assert_eq!(item.creation_date, item.last_modification_date);
    assert!(item.html_content.contains("<h1>Hello</h1>"));
    assert!(!item.html_content.contains("<script"));

    let page = alice.get_page("alice", "blog").await.unwrap();
    assert_eq!(page.last_modification_date, item.last_modification_date);
    assert_eq!(page.creation_date, before.creation_date);

    let stored = alice.get_item("alice", "blog", &item.id).await.unwrap();
    assert_eq!(stored, item);
}

#[tokio::test]
async fn test_item_without_body_is_rejected() {
    let env = TestApp::new().await;
    let alice = env.user_with_page("alice", "blog", Policy::Private).await;

    let err = alice
        .create_item("alice", "blog", Item::new(""))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { field: "content", .. }));
    assert!(alice.list_items("alice", "blog", 10).await.unwrap().is_empty());

    let mut link = Item::new("");
    link.url = "https://example.test".to_string();
    alice.create_item("alice", "blog", link).await.unwrap();
    assert_eq!(alice.list_items("alice", "blog", 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_item_writes_require_owner() {
    let env = TestApp::new().await;
    let alice = env.user_with_page("alice", "blog", Policy::Public).await;
    let item = alice
        .create_item("alice", "blog", Item::new("mine"))
        .await
        .unwrap();
    let bob = env.user("bob").await;

    let err = bob
        .create_item("alice", "blog", Item::new("intruder"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotAuthorized { .. }));

    let err = bob.put_item("alice", "blog", item.clone()).await.unwrap_err();
    assert!(matches!(err, AppError::NotAuthorized { .. }));

    let err = bob
        .update_item("alice", "blog", item.clone(), true)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotAuthorized { .. }));

    let err = bob
        .set_item_tag("alice", "blog", &item.id, "k", "v")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotAuthorized { .. }));

    let err = bob.delete_item("alice", "blog", &item.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotAuthorized { .. }));

    // Reading a public page's items is open.
    assert_eq!(bob.list_items("alice", "blog", 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_private_items_are_owner_only() {
    let env = TestApp::new().await;
    let alice = env.user_with_page("alice", "diary", Policy::Private).await;
    let item = alice
        .create_item("alice", "diary", Item::new("secret"))
        .await
        .unwrap();

    let anon = env.anonymous();
    assert!(matches!(
        anon.list_items("alice", "diary", 10).await,
        Err(AppError::NotAuthorized { .. })
    ));
    assert!(matches!(
        anon.get_item("alice", "diary", &item.id).await,
        Err(AppError::NotAuthorized { .. })
    ));
}

#[tokio::test]
async fn test_create_item_on_missing_page_stores_nothing() {
    let env = TestApp::new().await;
    let alice = env.user("alice").await;

    let err = alice
        .create_item("alice", "nowhere", Item::new("lost"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    alice.create_page(Page::new("alice", "nowhere")).await.unwrap();
    assert!(alice
        .list_items("alice", "nowhere", 10)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_create_item_retries_id_collisions() {
    let env = TestApp::new()
        .await
        .with_ids(&["first", "first", "second"]);
    let alice = env.user_with_page("alice", "blog", Policy::Private).await;

    let a = alice
        .create_item("alice", "blog", Item::new("a"))
        .await
        .unwrap();
    let b = alice
        .create_item("alice", "blog", Item::new("b"))
        .await
        .unwrap();
    assert_eq!(a.id, "first");
    assert_eq!(b.id, "second");
}

#[tokio::test]
async fn test_concurrent_creates_get_distinct_ids() {
    let env = TestApp::new().await;
    let alice = env.user_with_page("alice", "blog", Policy::Private).await;

    let (a, b, c, d) = tokio::join!(
        alice.create_item("alice", "blog", Item::new("a")),
        alice.create_item("alice", "blog", Item::new("b")),
        alice.create_item("alice", "blog", Item::new("c")),
        alice.create_item("alice", "blog", Item::new("d")),
    );
    let ids: HashSet<String> = [a, b, c, d]
        .into_iter()
        .map(|item| item.unwrap().id)
        .collect();
    assert_eq!(ids.len(), 4);
    assert_eq!(alice.list_items("alice", "blog", 10).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_put_item_keeps_given_timestamps() {
    let env = TestApp::new().await;
    let alice = env.user_with_page("alice", "blog", Policy::Private).await;

    let mut item = Item::new("imported");
    item.id = "fixed".to_string();
    item.creation_date -= Duration::days(10);
    item.last_modification_date -= Duration::days(5);

    let stored = alice.put_item("alice", "blog", item.clone()).await.unwrap();
    assert_eq!(stored.creation_date, item.creation_date);
    assert_eq!(stored.last_modification_date, item.last_modification_date);

    let page = alice.get_page("alice", "blog").await.unwrap();
    assert_eq!(page.last_modification_date, item.last_modification_date);

    item.id.clear();
    let err = alice.put_item("alice", "blog", item).await.unwrap_err();
    assert!(matches!(err, AppError::Validation { field: "id", .. }));
}

#[tokio::test]
async fn test_update_item_without_tags_keeps_stored_tags() {
    let env = TestApp::new().await;
    let alice = env.user_with_page("alice", "blog", Policy::Private).await;
    let created = alice
        .create_item("alice", "blog", tagged("v1", &[("b", "2"), ("a", "1")]))
        .await
        .unwrap();

    let mut edit = created.clone();
    edit.content = "v2".to_string();
    edit.tags = TagList::from(vec![Tag::new("zzz", "ignored")]);
    edit.creation_date -= Duration::days(1);
    let updated = alice
        .update_item("alice", "blog", edit, false)
        .await
        .unwrap();

    assert_eq!(updated.content, "v2");
    assert_eq!(updated.tags, created.tags);
    assert_eq!(updated.creation_date, created.creation_date);
    assert_eq!(
        alice.get_item("alice", "blog", &created.id).await.unwrap(),
        updated
    );
}

#[tokio::test]
async fn test_update_item_with_tags_replaces_them_sorted() {
    let env = TestApp::new().await;
    let alice = env.user_with_page("alice", "blog", Policy::Private).await;
    let created = alice
        .create_item("alice", "blog", tagged("v1", &[("old", "x")]))
        .await
        .unwrap();

    let mut edit = created.clone();
    edit.tags = [("zeta", "1"), ("alpha", "2")].into_iter().collect();
    let updated = alice
        .update_item("alice", "blog", edit, true)
        .await
        .unwrap();

    let keys: Vec<_> = updated.tags.iter().map(|t| t.key.as_str()).collect();
    assert_eq!(keys, ["alpha", "zeta"]);
    assert_eq!(updated.tags.tag("old"), None);

    let page = alice.get_page("alice", "blog").await.unwrap();
    assert_eq!(page.last_modification_date, updated.last_modification_date);
}

#[tokio::test]
async fn test_update_missing_item_is_not_found() {
    let env = TestApp::new().await;
    let alice = env.user_with_page("alice", "blog", Policy::Private).await;

    let mut item = Item::new("ghost");
    item.id = "nope".to_string();
    let err = alice
        .update_item("alice", "blog", item, true)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_set_item_tag() {
    let env = TestApp::new().await;
    let alice = env.user_with_page("alice", "blog", Policy::Private).await;
    let item = alice
        .create_item("alice", "blog", tagged("body", &[("color", "red")]))
        .await
        .unwrap();

    let tagged = alice
        .set_item_tag("alice", "blog", &item.id, "color", "blue")
        .await
        .unwrap();
    assert_eq!(tagged.tags.tag("color"), Some("blue"));
    assert_eq!(tagged.tags.len(), 1);
    assert!(tagged.last_modification_date >= item.last_modification_date);

    let page = alice.get_page("alice", "blog").await.unwrap();
    assert_eq!(page.last_modification_date, tagged.last_modification_date);

    let err = alice
        .set_item_tag("alice", "blog", &item.id, "", "x")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { field: "key", .. }));
}

#[tokio::test]
async fn test_delete_item_leaves_page_date() {
    let env = TestApp::new().await;
    let alice = env.user_with_page("alice", "blog", Policy::Private).await;
    let item = alice
        .create_item("alice", "blog", Item::new("bye"))
        .await
        .unwrap();
    let before = alice.get_page("alice", "blog").await.unwrap();

    alice.delete_item("alice", "blog", &item.id).await.unwrap();

    assert!(alice
        .get_item("alice", "blog", &item.id)
        .await
        .unwrap_err()
        .is_not_found());
    let after = alice.get_page("alice", "blog").await.unwrap();
    assert_eq!(after.last_modification_date, before.last_modification_date);
}

#[tokio::test]
async fn test_list_items_newest_first_with_limit() {
    let env = TestApp::new().await;
    let alice = env.user_with_page("alice", "blog", Policy::Private).await;

    for (i, id) in ["one", "two", "three"].iter().enumerate() {
        let mut item = Item::new(*id);
        item.id = id.to_string();
        item.last_modification_date += Duration::minutes(i as i64);
        alice.put_item("alice", "blog", item).await.unwrap();
    }

    let items = alice.list_items("alice", "blog", 2).await.unwrap();
    let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["three", "two"]);
}
