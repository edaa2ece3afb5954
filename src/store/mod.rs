//! Persistence for participants, OTP codes and news
//!
//! Everything lives in one SQLite database (`~/.memedrop/memedrop.db` by
//! default). The stores share a single connection guarded by a mutex.
//!
//! # Usage
//!
//! ```ignore
//! let store = Store::open(&config.database_path())?;
//! let record = store.participants().get(&wallet)?;
//! let news = store.news().list(20)?;
//! ```

mod db;
mod models;
mod news;
mod otp;
mod participants;

pub use db::Database;
pub use models::{NewsItem, OtpRecord, ParticipantRecord, ParticipantSummary};
pub use news::NewsStore;
pub use otp::OtpStore;
pub use participants::ParticipantStore;

use anyhow::Result;

/// Entry point to all stores
#[derive(Clone)]
pub struct Store {
    db: Database,
}

impl Store {
    pub fn open(path: &std::path::Path) -> Result<Self> {
        Ok(Self {
            db: Database::open(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            db: Database::open_in_memory()?,
        })
    }

    pub fn participants(&self) -> ParticipantStore {
        ParticipantStore::new(self.db.clone())
    }

    pub fn otp(&self) -> OtpStore {
        OtpStore::new(self.db.clone())
    }

    pub fn news(&self) -> NewsStore {
        NewsStore::new(self.db.clone())
    }
}
