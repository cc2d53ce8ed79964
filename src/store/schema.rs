//! Table creation and seed data

use deadpool_postgres::Pool;

use crate::store::error::Result;
use crate::store::types::NewKnowledge;

const CREATE_CONVERSATIONS: &str = "CREATE TABLE IF NOT EXISTS conversations (
    id SERIAL PRIMARY KEY,
    user_message TEXT,
    bot_response TEXT,
    timestamp TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
)";

const CREATE_KNOWLEDGE_BASE: &str = "CREATE TABLE IF NOT EXISTS knowledge_base (
    id SERIAL PRIMARY KEY,
    category TEXT,
    question TEXT,
    answer TEXT,
    source TEXT,
    created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
)";

const SEED_SOURCE: &str = "NCIRL Student Hub";

/// Entries inserted into an empty knowledge base
pub fn seed_entries() -> Vec<NewKnowledge> {
    vec![
        NewKnowledge::new(
            "admissions",
            "How do I apply to NCIRL?",
            "You can apply through the CAO system for undergraduate courses or directly through the NCIRL website for postgraduate programs. Visit www.ncirl.ie/apply for more information.",
        ),
        NewKnowledge::new(
            "library",
            "What are the library opening hours?",
            "The NCIRL library is open Monday-Friday 8:30am-9:30pm, Saturday 9am-5pm. Hours may vary during exam periods and holidays.",
        ),
        NewKnowledge::new(
            "support",
            "Where can I get academic support?",
            "NCIRL offers tutoring services, writing center support, and academic advising. Visit the Student Hub or book appointments through the student portal.",
        ),
        NewKnowledge::new(
            "facilities",
            "What facilities are available on campus?",
            "NCIRL campus includes computer labs, library, gym, cafeteria, student lounge, and study spaces. All facilities are accessible with your student ID card.",
        ),
    ]
    .into_iter()
    .map(|entry| entry.with_source(SEED_SOURCE))
    .collect()
}

/// Create both tables and seed the knowledge base when it is empty
///
/// Runs in one transaction; returns the number of seeded rows.
pub async fn init_schema(pool: &Pool) -> Result<u64> {
    let mut conn = pool.get().await?;
    let tx = conn.transaction().await?;

    tx.batch_execute(CREATE_CONVERSATIONS).await?;
    tx.batch_execute(CREATE_KNOWLEDGE_BASE).await?;

    let row = tx.query_one("SELECT COUNT(*) FROM knowledge_base", &[]).await?;
    let count: i64 = row.get(0);

    let mut seeded = 0;
    if count == 0 {
        let stmt = tx
            .prepare(
                "INSERT INTO knowledge_base (category, question, answer, source) VALUES ($1, $2, $3, $4)",
            )
            .await?;
        for entry in seed_entries() {
            seeded += tx
                .execute(
                    &stmt,
                    &[&entry.category, &entry.question, &entry.answer, &entry.source],
                )
                .await?;
        }
    }

    tx.commit().await?;

    tracing::info!(seeded, "Database initialized");
    Ok(seeded)
}
