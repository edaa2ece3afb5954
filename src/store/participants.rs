//! Participant records - persistence side of the airdrop session

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};

use super::db::Database;
use super::models::{ParticipantRecord, ParticipantSummary};
use crate::domain::{SessionSnapshot, TaskId};

#[derive(Clone)]
pub struct ParticipantStore {
    db: Database,
}

impl ParticipantStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Load a participant by (normalized) wallet address
    pub fn get(&self, wallet: &str) -> Result<Option<ParticipantRecord>> {
        let conn = self.db.conn();
        read_record(&conn, wallet)
    }

    /// Insert or replace a participant
    pub fn save(&self, record: &ParticipantRecord) -> Result<()> {
        let conn = self.db.conn();
        write_record(&conn, record)
    }

    /// Load, mutate and store a participant as one unit.
    ///
    /// The connection lock is held for the whole cycle, so concurrent updates
    /// for the same wallet are serialized. Nothing is written if `f` fails.
    /// Missing participants start from a fresh record.
    pub fn update<T>(
        &self,
        wallet: &str,
        f: impl FnOnce(&mut ParticipantRecord) -> Result<T>,
    ) -> Result<T> {
        let conn = self.db.conn();
        let tx = conn.unchecked_transaction()?;

        let now = Utc::now().timestamp_millis();
        let mut record = match read_record(&tx, wallet)? {
            Some(record) => record,
            None => ParticipantRecord::new(wallet, now),
        };

        let value = f(&mut record)?;
        record.updated_at = now;
        write_record(&tx, &record)?;
        tx.commit()?;
        Ok(value)
    }

    /// All participants, most recently updated first
    pub fn list(&self) -> Result<Vec<ParticipantRecord>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            r#"SELECT wallet_address, email, email_verified, completed_tasks,
                      claimed, claimed_tokens, created_at, updated_at
               FROM participants ORDER BY updated_at DESC"#,
        )?;
        let rows = stmt
            .query_map([], RawParticipant::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(RawParticipant::into_record).collect()
    }

    pub fn summary(&self) -> Result<ParticipantSummary> {
        let conn = self.db.conn();
        let summary = conn.query_row(
            r#"SELECT COUNT(*),
                      COALESCE(SUM(email_verified), 0),
                      COALESCE(SUM(claimed), 0),
                      COALESCE(SUM(claimed_tokens), 0)
               FROM participants"#,
            [],
            |r| {
                Ok(ParticipantSummary {
                    total: r.get::<_, i64>(0)? as u64,
                    verified: r.get::<_, i64>(1)? as u64,
                    claimed: r.get::<_, i64>(2)? as u64,
                    tokens_claimed: r.get::<_, i64>(3)? as u64,
                })
            },
        )?;
        Ok(summary)
    }
}

/// Row as stored, before the JSON task list is decoded
struct RawParticipant {
    wallet_address: String,
    email: Option<String>,
    email_verified: bool,
    completed_tasks: String,
    claimed: bool,
    claimed_tokens: i64,
    created_at: i64,
    updated_at: i64,
}

impl RawParticipant {
    fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            wallet_address: r.get(0)?,
            email: r.get(1)?,
            email_verified: r.get(2)?,
            completed_tasks: r.get(3)?,
            claimed: r.get(4)?,
            claimed_tokens: r.get(5)?,
            created_at: r.get(6)?,
            updated_at: r.get(7)?,
        })
    }

    fn into_record(self) -> Result<ParticipantRecord> {
        let completed_tasks: Vec<TaskId> = serde_json::from_str(&self.completed_tasks)
            .with_context(|| format!("Corrupt task list for {}", self.wallet_address))?;
        Ok(ParticipantRecord {
            wallet_address: self.wallet_address,
            email: self.email,
            snapshot: SessionSnapshot {
                email_verified: self.email_verified,
                completed_tasks,
                claimed: self.claimed,
                claimed_token_amount: self.claimed_tokens.max(0) as u64,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn read_record(conn: &Connection, wallet: &str) -> Result<Option<ParticipantRecord>> {
    let raw = conn
        .query_row(
            r#"SELECT wallet_address, email, email_verified, completed_tasks,
                      claimed, claimed_tokens, created_at, updated_at
               FROM participants WHERE wallet_address = ?1"#,
            [wallet],
            RawParticipant::from_row,
        )
        .optional()?;
    raw.map(RawParticipant::into_record).transpose()
}

fn write_record(conn: &Connection, record: &ParticipantRecord) -> Result<()> {
    let completed = serde_json::to_string(&record.snapshot.completed_tasks)?;
    conn.execute(
        r#"INSERT INTO participants
               (wallet_address, email, email_verified, completed_tasks,
                claimed, claimed_tokens, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
           ON CONFLICT(wallet_address) DO UPDATE SET
               email = excluded.email,
               email_verified = excluded.email_verified,
               completed_tasks = excluded.completed_tasks,
               claimed = excluded.claimed,
               claimed_tokens = excluded.claimed_tokens,
               updated_at = excluded.updated_at"#,
        rusqlite::params![
            record.wallet_address,
            record.email,
            record.snapshot.email_verified,
            completed,
            record.snapshot.claimed,
            record.snapshot.claimed_token_amount as i64,
            record.created_at,
            record.updated_at,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET: &str = "0x00000000000000000000000000000000000000aa";

    fn store() -> ParticipantStore {
        ParticipantStore::new(Database::open_in_memory().unwrap())
    }

    #[test]
    fn test_missing_participant() {
        assert!(store().get(WALLET).unwrap().is_none());
    }

    #[test]
    fn test_update_creates_and_persists() {
        let store = store();
        store
            .update(WALLET, |record| {
                record.email = Some("a@example.com".to_string());
                record.snapshot.email_verified = true;
                record.snapshot.completed_tasks = vec![TaskId::from("follow_x")];
                Ok(())
            })
            .unwrap();

        let record = store.get(WALLET).unwrap().unwrap();
        assert_eq!(record.email.as_deref(), Some("a@example.com"));
        assert!(record.snapshot.email_verified);
        assert_eq!(record.snapshot.completed_tasks, vec![TaskId::from("follow_x")]);
        assert!(record.updated_at >= record.created_at);
    }

    #[test]
    fn test_failed_update_writes_nothing() {
        let store = store();
        let result: Result<()> = store.update(WALLET, |record| {
            record.snapshot.claimed = true;
            anyhow::bail!("nope")
        });
        assert!(result.is_err());
        assert!(store.get(WALLET).unwrap().is_none());
    }

    #[test]
    fn test_summary_and_list() {
        let store = store();
        let now = Utc::now().timestamp_millis();

        let mut a = ParticipantRecord::new(WALLET, now);
        a.snapshot = SessionSnapshot {
            email_verified: true,
            completed_tasks: Vec::new(),
            claimed: true,
            claimed_token_amount: 500,
        };
        store.save(&a).unwrap();
        store
            .save(&ParticipantRecord::new(
                "0x00000000000000000000000000000000000000bb",
                now + 1,
            ))
            .unwrap();

        let summary = store.summary().unwrap();
        assert_eq!(
            summary,
            ParticipantSummary {
                total: 2,
                verified: 1,
                claimed: 1,
                tokens_claimed: 500,
            }
        );

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].wallet_address, "0x00000000000000000000000000000000000000bb");
        assert_eq!(listed[1], a);
    }
}
