use deadpool_postgres::Pool;
use tokio_postgres::Row;

use crate::store::{
    error::{Result, StoreError},
    types::{KnowledgeEntry, KnowledgeSnippet, NewKnowledge},
};

const INSERT_SQL: &str =
    "INSERT INTO knowledge_base (category, question, answer, source) VALUES ($1, $2, $3, $4) RETURNING id";

/// Insert one knowledge entry, returning its id
pub async fn insert_knowledge(pool: &Pool, entry: &NewKnowledge) -> Result<i32> {
    let conn = pool.get().await?;
    let row = conn
        .query_one(
            INSERT_SQL,
            &[&entry.category, &entry.question, &entry.answer, &entry.source],
        )
        .await?;
    Ok(row.get(0))
}

/// Insert many entries atomically
///
/// Either every entry is stored or none is. Returns the number inserted.
pub async fn insert_knowledge_batch(pool: &Pool, entries: &[NewKnowledge]) -> Result<u64> {
    if entries.is_empty() {
        return Ok(0);
    }

    let mut conn = pool.get().await?;
    let tx = conn.transaction().await?;
    let stmt = tx.prepare(INSERT_SQL).await?;

    let mut inserted = 0;
    for entry in entries {
        tx.query_one(
            &stmt,
            &[&entry.category, &entry.question, &entry.answer, &entry.source],
        )
        .await?;
        inserted += 1;
    }

    tx.commit().await?;
    Ok(inserted)
}

/// All entries, newest first
pub async fn list_knowledge(pool: &Pool) -> Result<Vec<KnowledgeEntry>> {
    let conn = pool.get().await?;
    let rows = conn
        .query(
            "SELECT id, category, question, answer, source, created_at FROM knowledge_base ORDER BY created_at DESC, id DESC",
            &[],
        )
        .await?;

    Ok(rows.iter().map(row_to_entry).collect())
}

/// Full-table read used to build the prompt context
///
/// No ordering is applied; the prompt does not depend on it.
pub async fn select_all_knowledge(pool: &Pool) -> Result<Vec<KnowledgeSnippet>> {
    let conn = pool.get().await?;
    let rows = conn
        .query("SELECT category, question, answer FROM knowledge_base", &[])
        .await?;

    Ok(rows
        .iter()
        .map(|row| KnowledgeSnippet {
            category: text_column(row, 0),
            question: text_column(row, 1),
            answer: text_column(row, 2),
        })
        .collect())
}

/// Overwrite every editable field of entry `id`
pub async fn update_knowledge(pool: &Pool, id: i32, entry: &NewKnowledge) -> Result<()> {
    let conn = pool.get().await?;
    let updated = conn
        .execute(
            "UPDATE knowledge_base SET category = $1, question = $2, answer = $3, source = $4 WHERE id = $5",
            &[&entry.category, &entry.question, &entry.answer, &entry.source, &id],
        )
        .await?;

    if updated == 0 {
        return Err(StoreError::NotFound(format!("knowledge entry {}", id)));
    }
    Ok(())
}

pub async fn delete_knowledge(pool: &Pool, id: i32) -> Result<()> {
    let conn = pool.get().await?;
    let deleted = conn
        .execute("DELETE FROM knowledge_base WHERE id = $1", &[&id])
        .await?;

    if deleted == 0 {
        return Err(StoreError::NotFound(format!("knowledge entry {}", id)));
    }
    Ok(())
}

// Columns are nullable in the schema; NULL reads as empty text.
fn text_column(row: &Row, idx: usize) -> String {
    row.get::<_, Option<String>>(idx).unwrap_or_default()
}

fn row_to_entry(row: &Row) -> KnowledgeEntry {
    KnowledgeEntry {
        id: row.get(0),
        category: text_column(row, 1),
        question: text_column(row, 2),
        answer: text_column(row, 3),
        source: row.get(4),
        created_at: row.get(5),
    }
}
