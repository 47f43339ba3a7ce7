//! Demo data for local development.

use anyhow::{Context, Result};
use parlor_chats::{ConversationRepository, MessageRepository, NotificationRepository};
use tracing::info;

use crate::BackendServices;

const DEMO_MESSAGES: &[(usize, &str)] = &[
    (1, "hello world"),
    (0, "Hi Bob! Did you see the trophy board?"),
    (1, "Not yet, sharing the link in a minute"),
];

#[derive(Debug, Clone)]
pub struct SeededUser {
    pub public_id: String,
    pub display_name: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct SeedReport {
    pub conversation_id: String,
    pub users: Vec<SeededUser>,
    pub messages: usize,
}

/// Two users sharing one conversation, a short exchange, and a welcome
/// notification for the first user. Every run creates fresh rows.
pub async fn seed_demo_data(services: &BackendServices) -> Result<SeedReport> {
    let pool = services.db_pool.clone();
    let mut users = Vec::new();
    let mut ids = Vec::new();

    for name in ["Alice", "Bob"] {
        let user = services
            .authenticator
            .create_user(None, Some(name))
            .await
            .with_context(|| format!("failed to create demo user {name}"))?;
        let session = services
            .authenticator
            .issue_session(user.id)
            .await
            .with_context(|| format!("failed to issue session for {name}"))?;

        ids.push(user.id);
        users.push(SeededUser {
            public_id: user.public_id,
            display_name: name.to_string(),
            token: session.token,
        });
    }

    let conversation = ConversationRepository::new(pool.clone())
        .create(Some("Welcome"), &ids)
        .await
        .context("failed to create demo conversation")?;

    let messages = MessageRepository::new(pool.clone());
    for (author, body) in DEMO_MESSAGES {
        messages
            .create(&conversation.public_id, ids[*author], body)
            .await
            .context("failed to insert demo message")?;
    }

    NotificationRepository::new(pool)
        .create(ids[0], "system", "Welcome to Parlor", "Your demo conversation is ready")
        .await
        .context("failed to insert demo notification")?;

    info!(
        conversation_id = %conversation.public_id,
        users = users.len(),
        messages = DEMO_MESSAGES.len(),
        "seeded demo data"
    );

    Ok(SeedReport {
        conversation_id: conversation.public_id,
        users,
        messages: DEMO_MESSAGES.len(),
    })
}
