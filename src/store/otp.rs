//! Storage of issued one-time passcodes

use anyhow::Result;
use rusqlite::OptionalExtension;

use super::db::Database;
use super::models::OtpRecord;

#[derive(Clone)]
pub struct OtpStore {
    db: Database,
}

impl OtpStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Store a new code. Earlier unconsumed codes for the same email are
    /// invalidated so only the latest one can be used.
    pub fn insert(&self, email: &str, code: &str, expires_at: i64, now: i64) -> Result<i64> {
        let conn = self.db.conn();
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE otp_codes SET consumed = 1 WHERE email = ?1 AND consumed = 0",
            [email],
        )?;
        tx.execute(
            "INSERT INTO otp_codes (email, code, expires_at, attempts, consumed, created_at)
             VALUES (?1, ?2, ?3, 0, 0, ?4)",
            rusqlite::params![email, code, expires_at, now],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    /// Latest unconsumed, unexpired code for an email
    pub fn latest_active(&self, email: &str, now: i64) -> Result<Option<OtpRecord>> {
        let conn = self.db.conn();
        let record = conn
            .query_row(
                r#"SELECT id, email, code, expires_at, attempts, consumed, created_at
                   FROM otp_codes
                   WHERE email = ?1 AND consumed = 0 AND expires_at > ?2
                   ORDER BY id DESC LIMIT 1"#,
                rusqlite::params![email, now],
                |r| {
                    Ok(OtpRecord {
                        id: r.get(0)?,
                        email: r.get(1)?,
                        code: r.get(2)?,
                        expires_at: r.get(3)?,
                        attempts: r.get(4)?,
                        consumed: r.get(5)?,
                        created_at: r.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Count a failed guess. Returns the new attempt count.
    pub fn record_attempt(&self, id: i64) -> Result<u32> {
        let conn = self.db.conn();
        conn.execute("UPDATE otp_codes SET attempts = attempts + 1 WHERE id = ?1", [id])?;
        let attempts = conn.query_row("SELECT attempts FROM otp_codes WHERE id = ?1", [id], |r| r.get(0))?;
        Ok(attempts)
    }

    pub fn consume(&self, id: i64) -> Result<()> {
        let conn = self.db.conn();
        conn.execute("UPDATE otp_codes SET consumed = 1 WHERE id = ?1", [id])?;
        Ok(())
    }

    /// Delete expired and consumed codes. Returns the number removed.
    pub fn purge_expired(&self, now: i64) -> Result<usize> {
        let conn = self.db.conn();
        let removed = conn.execute(
            "DELETE FROM otp_codes WHERE consumed = 1 OR expires_at <= ?1",
            [now],
        )?;
        Ok(removed)
    }
}
