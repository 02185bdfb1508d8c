//! Deck repository: upsert/lookup for the `decks` table.
//!
//! Cards, mcqs and the plan are stored as JSON TEXT blobs; the store layer
//! owns serialization so a deck is always written whole or not at all.

use rusqlite::{params, Row};

use super::{Database, DatabaseError};

/// A raw deck row from the database.
#[derive(Debug, Clone)]
pub struct DeckRow {
    pub id: String,
    pub title: String,
    pub level: String,
    pub subject: Option<String>,
    pub source_filename: String,
    pub cards: String,
    pub mcqs: String,
    pub plan: String,
    pub created_at: String,
}

impl DeckRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            level: row.get("level")?,
            subject: row.get("subject")?,
            source_filename: row.get("source_filename")?,
            cards: row.get("cards")?,
            mcqs: row.get("mcqs")?,
            plan: row.get("plan")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Inserts or replaces a deck row (upsert by id).
pub fn upsert(db: &Database, deck: &DeckRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT OR REPLACE INTO decks
             (id, title, level, subject, source_filename, cards, mcqs, plan, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                deck.id,
                deck.title,
                deck.level,
                deck.subject,
                deck.source_filename,
                deck.cards,
                deck.mcqs,
                deck.plan,
                deck.created_at,
            ],
        )?;
        Ok(())
    })
}

/// Finds a deck by its ID.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<DeckRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM decks WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], DeckRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        Database::open_in_memory().expect("Failed to create test database")
    }

    fn sample_deck(id: &str) -> DeckRow {
        DeckRow {
            id: id.to_string(),
            title: "Renal physiology".to_string(),
            level: "intro".to_string(),
            subject: Some("medicine".to_string()),
            source_filename: "renal.txt".to_string(),
            cards: r#"[{"id":"c1","question":"q","answer":"a"}]"#.to_string(),
            mcqs: "[]".to_string(),
            plan: r#"["Day 1: overview"]"#.to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_upsert_and_find() {
        let db = test_db();
        upsert(&db, &sample_deck("deck-1")).unwrap();

        let found = find_by_id(&db, "deck-1").unwrap();
        assert!(found.is_some());
        let found = found.unwrap();
        assert_eq!(found.title, "Renal physiology");
        assert_eq!(found.subject.as_deref(), Some("medicine"));
    }

    #[test]
    fn test_find_nonexistent() {
        let db = test_db();
        assert!(find_by_id(&db, "missing").unwrap().is_none());
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let db = test_db();
        upsert(&db, &sample_deck("deck-2")).unwrap();

        let mut updated = sample_deck("deck-2");
        updated.title = "Renal physiology (revised)".to_string();
        upsert(&db, &updated).unwrap();

        let found = find_by_id(&db, "deck-2").unwrap().unwrap();
        assert_eq!(found.title, "Renal physiology (revised)");

        let count = db
            .with_conn(|conn| {
                let c: u32 = conn.query_row("SELECT COUNT(*) FROM decks", [], |r| r.get(0))?;
                Ok(c)
            })
            .unwrap();
        assert_eq!(count, 1);
    }
}
