//! Integration tests for the chats crate against a real SQLite database.

use std::sync::Arc;

use chrono::Utc;
use parlor_chats::{
    ChatError, ChatServices, ConversationRepository, MessageRepository, MessageStore,
    NotificationRepository, ParticipantDirectory, ReadMarkerRepository, ReadMarkerStore,
    SearchQuery,
};
use parlor_config::{DatabaseConfig, MessagingConfig};
use sqlx::SqlitePool;
use tempfile::TempDir;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

struct TestContext {
    pool: SqlitePool,
    services: ChatServices,
    conversations: ConversationRepository,
    messages: MessageRepository,
    _temp_dir: TempDir,
}

impl TestContext {
    async fn new() -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("chats.sqlite");

        let pool = parlor_database::initialize_database(&DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 5,
        })
        .await?;

        Ok(Self {
            services: ChatServices::sqlite(pool.clone(), &MessagingConfig::default()),
            conversations: ConversationRepository::new(pool.clone()),
            messages: MessageRepository::new(pool.clone()),
            pool,
            _temp_dir: temp_dir,
        })
    }

    async fn insert_user(&self, public_id: &str) -> TestResult<i64> {
        let now = Utc::now().to_rfc3339();
        let id = sqlx::query(
            "INSERT INTO users (public_id, email, display_name, created_at, updated_at) VALUES (?, NULL, ?, ?, ?)",
        )
        .bind(public_id)
        .bind(public_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }
}

#[tokio::test]
async fn scenario_search_and_mark_read_round_trip() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.insert_user("alice").await?;
    let bob = ctx.insert_user("bob").await?;
    let carol = ctx.insert_user("carol").await?;

    let c1 = ctx.conversations.create(Some("C1"), &[alice, bob]).await?;
    let hello = ctx.messages.create(&c1.public_id, bob, "hello world").await?;

    let results = ctx.services.search.search(alice, &SearchQuery::new("hello")).await?;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].body, "hello world");
    assert_eq!(results[0].conversation_id, c1.public_id);
    assert_eq!(results[0].author_public_id, "bob");

    assert!(ctx.services.search.search(carol, &SearchQuery::new("hi")).await?.is_empty());

    let err = ctx
        .services
        .search
        .search(alice, &SearchQuery::new("h"))
        .await
        .expect_err("single character query must fail");
    assert!(matches!(err, ChatError::InvalidArgument { .. }));

    let marker = ctx
        .services
        .read_state
        .mark_read(&c1.public_id, alice, None)
        .await?
        .expect("marker should exist");
    assert_eq!(marker.last_read_message_id, hello.sequence);

    Ok(())
}

#[tokio::test]
async fn registry_distinguishes_missing_conversation_from_non_member() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.insert_user("alice").await?;
    let carol = ctx.insert_user("carol").await?;
    let c1 = ctx.conversations.create(None, &[alice]).await?;

    assert!(ctx.services.registry.is_participant(&c1.public_id, alice).await?);
    assert!(!ctx.services.registry.is_participant(&c1.public_id, carol).await?);

    let err = ctx
        .services
        .registry
        .is_participant("does-not-exist", alice)
        .await
        .expect_err("missing conversation");
    assert!(matches!(err, ChatError::ConversationNotFound { .. }));

    ctx.conversations.add_participant(&c1.public_id, carol).await?;
    assert!(ctx.services.registry.is_participant(&c1.public_id, carol).await?);

    Ok(())
}

#[tokio::test]
async fn read_marker_upsert_is_monotonic() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.insert_user("alice").await?;
    let c1 = ctx.conversations.create(None, &[alice]).await?;
    let markers = ReadMarkerRepository::new(ctx.pool.clone());

    assert!(markers.advance(&c1.public_id, alice, 10).await?);
    assert!(!markers.advance(&c1.public_id, alice, 4).await?);
    assert!(!markers.advance(&c1.public_id, alice, 10).await?);
    assert!(markers.advance(&c1.public_id, alice, 11).await?);

    let marker = markers.get(&c1.public_id, alice).await?.expect("marker");
    assert_eq!(marker.last_read_message_id, 11);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM read_markers")
        .fetch_one(&ctx.pool)
        .await?;
    assert_eq!(rows, 1, "at most one marker per pair");

    assert!(!markers.advance("missing", alice, 3).await?);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_mark_read_keeps_maximum() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.insert_user("alice").await?;
    let bob = ctx.insert_user("bob").await?;
    let c1 = ctx.conversations.create(None, &[alice, bob]).await?;

    let mut sequences = Vec::new();
    for i in 0..25 {
        sequences.push(ctx.messages.create(&c1.public_id, bob, &format!("message {i}")).await?.sequence);
    }
    let max = *sequences.iter().max().expect("messages");

    let tracker = Arc::new(ctx.services.read_state.clone());
    let mut handles = Vec::new();
    for sequence in sequences.into_iter().rev() {
        let tracker = Arc::clone(&tracker);
        let conversation = c1.public_id.clone();
        handles.push(tokio::spawn(async move {
            tracker.mark_read(&conversation, alice, Some(sequence)).await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let marker = ctx
        .services
        .read_state
        .marker(&c1.public_id, alice)
        .await?
        .expect("marker");
    assert_eq!(marker.last_read_message_id, max);

    Ok(())
}

#[tokio::test]
async fn search_scopes_to_visible_conversations() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.insert_user("alice").await?;
    let bob = ctx.insert_user("bob").await?;
    let mallory = ctx.insert_user("mallory").await?;

    let shared = ctx.conversations.create(None, &[alice, bob]).await?;
    let private = ctx.conversations.create(None, &[bob, mallory]).await?;
    ctx.messages.create(&private.public_id, mallory, "Hello secret plans").await?;
    let visible = ctx.messages.create(&shared.public_id, bob, "HELLO alice").await?;

    let results = ctx.services.search.search(alice, &SearchQuery::new("hello")).await?;
    assert_eq!(results.iter().map(|m| m.sequence).collect::<Vec<_>>(), vec![visible.sequence]);

    let err = ctx
        .services
        .search
        .search(alice, &SearchQuery::new("hello").in_conversation(private.public_id.clone()))
        .await
        .expect_err("outsider filter");
    assert!(matches!(err, ChatError::AccessDenied { .. }));

    let bob_results = ctx.services.search.search(bob, &SearchQuery::new("hello")).await?;
    assert_eq!(bob_results.len(), 2);
    assert!(bob_results[0].sequence > bob_results[1].sequence);

    Ok(())
}

#[tokio::test]
async fn search_treats_like_wildcards_literally() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.insert_user("alice").await?;
    let c1 = ctx.conversations.create(None, &[alice]).await?;
    ctx.messages.create(&c1.public_id, alice, "save 50% today").await?;
    ctx.messages.create(&c1.public_id, alice, "save 500 today").await?;
    ctx.messages.create(&c1.public_id, alice, "snake_case names").await?;
    ctx.messages.create(&c1.public_id, alice, "snakeXcase names").await?;

    let percent = ctx.services.search.search(alice, &SearchQuery::new("50%")).await?;
    assert_eq!(percent.len(), 1);
    assert_eq!(percent[0].body, "save 50% today");

    let underscore = ctx.services.search.search(alice, &SearchQuery::new("e_c")).await?;
    assert_eq!(underscore.len(), 1);
    assert_eq!(underscore[0].body, "snake_case names");

    Ok(())
}

#[tokio::test]
async fn externally_created_ids_are_opaque() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.insert_user("alice").await?;
    let bob = ctx.insert_user("bob").await?;
    let now = Utc::now().to_rfc3339();
    sqlx::query("INSERT INTO conversations (public_id, title, created_at, updated_at) VALUES (?, NULL, ?, ?)")
        .bind("team chat")
        .bind(&now)
        .bind(&now)
        .execute(&ctx.pool)
        .await?;
    ctx.conversations.add_participant("team chat", alice).await?;
    let message = ctx.messages.create("team chat", bob, "standup moved").await?;

    assert!(ctx.services.registry.is_participant("team chat", alice).await?);
    assert!(!ctx.services.registry.is_participant("team chat", bob).await?);

    let marker = ctx
        .services
        .read_state
        .mark_read("team chat", alice, None)
        .await?
        .ok_or("marker should exist")?;
    assert_eq!(marker.last_read_message_id, message.sequence);

    let results = ctx
        .services
        .search
        .search(alice, &SearchQuery::new("standup").in_conversation("team chat"))
        .await?;
    assert_eq!(results.len(), 1);

    let err = ctx
        .services
        .registry
        .is_participant(&"z".repeat(300), alice)
        .await
        .expect_err("unknown id should not resolve");
    assert!(matches!(err, ChatError::ConversationNotFound { .. }));
    Ok(())
}

#[tokio::test]
async fn non_ascii_needles_fold_through_unicode_lowercase() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.insert_user("alice").await?;
    let c1 = ctx.conversations.create(None, &[alice]).await?;
    // U+212A KELVIN SIGN lowercases to an ASCII 'k'
    ctx.messages.create(&c1.public_id, alice, "ran 5 km today").await?;

    let results = ctx
        .services
        .search
        .search(alice, &SearchQuery::new("5 \u{212A}m"))
        .await?;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].body, "ran 5 km today");
    Ok(())
}

#[tokio::test]
async fn search_folds_non_ascii_case() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.insert_user("alice").await?;
    let c1 = ctx.conversations.create(None, &[alice]).await?;
    ctx.messages.create(&c1.public_id, alice, "Grüße aus KÖLN").await?;
    ctx.messages.create(&c1.public_id, alice, "Greetings from Bonn").await?;

    let results = ctx.services.search.search(alice, &SearchQuery::new("köln")).await?;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].body, "Grüße aus KÖLN");

    Ok(())
}

#[tokio::test]
async fn search_limit_is_clamped_and_applied() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.insert_user("alice").await?;
    let c1 = ctx.conversations.create(None, &[alice]).await?;
    for i in 0..5 {
        ctx.messages.create(&c1.public_id, alice, &format!("ping {i}")).await?;
    }

    let limited = ctx
        .services
        .search
        .search(alice, &SearchQuery::new("ping").with_limit(3))
        .await?;
    assert_eq!(
        limited.iter().map(|m| m.body.as_str()).collect::<Vec<_>>(),
        ["ping 4", "ping 3", "ping 2"]
    );

    let clamped = ctx
        .services
        .search
        .search(alice, &SearchQuery::new("ping").with_limit(10_000))
        .await?;
    assert_eq!(clamped.len(), 5);

    Ok(())
}

#[tokio::test]
async fn listing_and_unread_counts() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.insert_user("alice").await?;
    let bob = ctx.insert_user("bob").await?;
    let c1 = ctx.conversations.create(None, &[alice, bob]).await?;

    let first = ctx.messages.create(&c1.public_id, bob, "one").await?;
    ctx.messages.create(&c1.public_id, alice, "two").await?;
    ctx.messages.create(&c1.public_id, bob, "three").await?;

    let page = ctx
        .services
        .messages
        .list_messages(&c1.public_id, alice, Some(first.sequence), None)
        .await?;
    assert_eq!(page.iter().map(|m| m.body.as_str()).collect::<Vec<_>>(), ["two", "three"]);

    let summary = ctx.services.read_state.unread_count(&c1.public_id, alice).await?;
    assert_eq!(summary.unread_count, 2);

    ctx.services
        .read_state
        .mark_read(&c1.public_id, alice, Some(first.sequence))
        .await?;
    let summary = ctx.services.read_state.unread_count(&c1.public_id, alice).await?;
    assert_eq!(summary.unread_count, 1);
    assert_eq!(summary.last_read_message_id, Some(first.sequence));

    Ok(())
}

#[tokio::test]
async fn message_store_lookups() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.insert_user("alice").await?;
    let c1 = ctx.conversations.create(None, &[alice]).await?;
    let c2 = ctx.conversations.create(None, &[alice]).await?;

    assert!(ctx.messages.latest_message(&c1.public_id).await?.is_none());
    let m1 = ctx.messages.create(&c1.public_id, alice, "first").await?;
    let m2 = ctx.messages.create(&c2.public_id, alice, "other").await?;

    assert_eq!(ctx.messages.latest_message(&c1.public_id).await?, Some(m1.clone()));
    assert!(ctx.messages.find_message(&c1.public_id, m2.sequence).await?.is_none());
    assert_eq!(ctx.conversations.conversations_for_user(alice).await?.len(), 2);

    let err = ctx
        .messages
        .create("missing", alice, "orphan")
        .await
        .expect_err("unknown conversation");
    assert!(matches!(err, ChatError::ConversationNotFound { .. }));

    Ok(())
}

#[tokio::test]
async fn notifications_mark_all_read() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.insert_user("alice").await?;
    let bob = ctx.insert_user("bob").await?;
    let notifications = NotificationRepository::new(ctx.pool.clone());

    notifications.create(alice, "mention", "You were mentioned", "bob mentioned you").await?;
    notifications.create(alice, "system", "Welcome", "Hello!").await?;
    notifications.create(bob, "system", "Welcome", "Hello!").await?;

    assert_eq!(ctx.services.notifications.mark_all_read(alice).await?, 2);
    assert_eq!(ctx.services.notifications.mark_all_read(alice).await?, 0);

    let remaining = notifications.find_by_user_id(bob, 10).await?;
    assert_eq!(remaining.len(), 1);
    assert!(!remaining[0].read);

    Ok(())
}
