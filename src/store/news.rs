//! News items managed by admins

use anyhow::Result;

use super::db::Database;
use super::models::NewsItem;

#[derive(Clone)]
pub struct NewsStore {
    db: Database,
}

impl NewsStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Newest first
    pub fn list(&self, limit: usize) -> Result<Vec<NewsItem>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT id, title, body, link, published_at FROM news
             ORDER BY published_at DESC, id LIMIT ?1",
        )?;
        let items = stmt
            .query_map([limit as i64], |r| {
                Ok(NewsItem {
                    id: r.get(0)?,
                    title: r.get(1)?,
                    body: r.get(2)?,
                    link: r.get(3)?,
                    published_at: r.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// Create a news item with a fresh id
    pub fn insert(&self, title: &str, body: &str, link: Option<&str>, published_at: i64) -> Result<NewsItem> {
        let item = NewsItem {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            body: body.to_string(),
            link: link.map(str::to_string),
            published_at,
        };
        let conn = self.db.conn();
        conn.execute(
            "INSERT INTO news (id, title, body, link, published_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![item.id, item.title, item.body, item.link, item.published_at],
        )?;
        Ok(item)
    }

    /// Returns false if no item had this id
    pub fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.db.conn();
        let removed = conn.execute("DELETE FROM news WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }
}
