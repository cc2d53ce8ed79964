use deadpool_postgres::Pool;

use crate::store::{error::Result, types::ConversationRecord};

/// Number of conversations shown in the admin history view
pub const HISTORY_LIMIT: i64 = 50;

/// Append one completed chat turn
pub async fn insert_conversation(pool: &Pool, user_message: &str, bot_response: &str) -> Result<()> {
    let conn = pool.get().await?;
    conn.execute(
        "INSERT INTO conversations (user_message, bot_response) VALUES ($1, $2)",
        &[&user_message, &bot_response],
    )
    .await?;
    Ok(())
}

/// Most recent conversations, newest first
pub async fn recent_conversations(pool: &Pool, limit: i64) -> Result<Vec<ConversationRecord>> {
    let conn = pool.get().await?;
    let rows = conn
        .query(
            "SELECT user_message, bot_response, timestamp FROM conversations ORDER BY timestamp DESC, id DESC LIMIT $1",
            &[&limit],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| ConversationRecord {
            user_message: row.get::<_, Option<String>>(0).unwrap_or_default(),
            bot_response: row.get::<_, Option<String>>(1).unwrap_or_default(),
            timestamp: row.get(2),
        })
        .collect())
}
