use crate::error::{Result, StoreError};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::str::FromStr;
use vibebot_core::domain::{
    Interaction, InteractionId, InteractionStatus, InteractionUpsert, Metrics, Platform,
};
use vibebot_core::dto::StatsDto;
use vibebot_core::rules::{enrich, materialize, normalize_external_id};
use vibebot_core::CoreError;

const SELECT_COLUMNS: &str = "id, platform, external_post_id, content, author_name, author_handle,
        url, metrics_json, media_url, tag, reply_text, status, created_at";

pub struct InteractionsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> InteractionsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert-or-enrich keyed by `external_post_id`, in one immediate
    /// transaction so concurrent captures of the same post serialise.
    pub fn upsert(&self, now_utc: i64, update: InteractionUpsert) -> Result<Interaction> {
        let key = normalize_external_id(&update.external_post_id)?;
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let interaction = match find_by_external_id_inner(&tx, &key)? {
            Some(existing) => {
                let merged = enrich(&existing, update).map_err(transition_error)?;
                if merged != existing {
                    update_row(&tx, &merged)?;
                }
                merged
            }
            None => {
                let created =
                    materialize(InteractionId::new(), now_utc, update).map_err(transition_error)?;
                insert_row(&tx, &created)?;
                created
            }
        };

        tx.commit()?;
        Ok(interaction)
    }

    pub fn exists(&self, external_post_id: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM interactions WHERE external_post_id = ?1 LIMIT 1;",
                [external_post_id.trim()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Newest first.
    pub fn recent(&self, limit: i64) -> Result<Vec<Interaction>> {
        self.list(limit, 0)
    }

    pub fn list(&self, limit: i64, offset: i64) -> Result<Vec<Interaction>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS}
             FROM interactions
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?1 OFFSET ?2;"
        ))?;
        let mut rows = stmt.query(params![limit, offset])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(interaction_from_row(row)?);
        }
        Ok(items)
    }

    pub fn get(&self, id: InteractionId) -> Result<Interaction> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM interactions WHERE id = ?1;"
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => interaction_from_row(row),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    pub fn find_by_external_id(&self, external_post_id: &str) -> Result<Option<Interaction>> {
        find_by_external_id_inner(self.conn, external_post_id.trim())
    }

    pub fn stats(&self) -> Result<StatsDto> {
        let mut stats = StatsDto::default();
        let mut stmt = self.conn.prepare(
            "SELECT platform, status, COUNT(*) FROM interactions GROUP BY platform, status;",
        )?;
        let rows = stmt.query_map([], |row| {
            let platform: String = row.get(0)?;
            let status: String = row.get(1)?;
            let count: i64 = row.get(2)?;
            Ok((platform, status, count))
        })?;
        for row in rows {
            let (platform, status, count) = row?;
            stats.total += count;
            *stats.by_platform.entry(platform).or_insert(0) += count;
            *stats.by_status.entry(status).or_insert(0) += count;
        }
        Ok(stats)
    }

    /// Deletes every interaction. Operator-triggered only.
    pub fn clear_all(&self) -> Result<usize> {
        let deleted = self.conn.execute("DELETE FROM interactions;", [])?;
        Ok(deleted)
    }
}

fn find_by_external_id_inner(conn: &Connection, key: &str) -> Result<Option<Interaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SELECT_COLUMNS} FROM interactions WHERE external_post_id = ?1;"
    ))?;
    let mut rows = stmt.query([key])?;
    match rows.next()? {
        Some(row) => Ok(Some(interaction_from_row(row)?)),
        None => Ok(None),
    }
}

fn insert_row(conn: &Connection, interaction: &Interaction) -> Result<()> {
    conn.execute(
        "INSERT INTO interactions
         (id, platform, external_post_id, content, author_name, author_handle, url,
          metrics_json, media_url, tag, reply_text, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
        params![
            interaction.id.to_string(),
            interaction.platform.as_str(),
            interaction.external_post_id,
            interaction.content,
            interaction.author_name,
            interaction.author_handle,
            interaction.url,
            serialize_metrics(interaction.metrics.as_ref())?,
            interaction.media_url,
            interaction.tag,
            interaction.reply_text,
            interaction.status.as_str(),
            interaction.created_at,
        ],
    )?;
    Ok(())
}

fn update_row(conn: &Connection, interaction: &Interaction) -> Result<()> {
    conn.execute(
        "UPDATE interactions
         SET platform = ?2,
             content = ?3,
             author_name = ?4,
             author_handle = ?5,
             url = ?6,
             metrics_json = ?7,
             media_url = ?8,
             tag = ?9,
             reply_text = ?10,
             status = ?11
         WHERE id = ?1;",
        params![
            interaction.id.to_string(),
            interaction.platform.as_str(),
            interaction.content,
            interaction.author_name,
            interaction.author_handle,
            interaction.url,
            serialize_metrics(interaction.metrics.as_ref())?,
            interaction.media_url,
            interaction.tag,
            interaction.reply_text,
            interaction.status.as_str(),
        ],
    )?;
    Ok(())
}

fn transition_error(err: CoreError) -> StoreError {
    match err {
        CoreError::PostedWithoutReply(id) => {
            StoreError::InvalidTransition(format!("{id}: POSTED requires reply text"))
        }
        other => StoreError::Core(other),
    }
}

fn serialize_metrics(metrics: Option<&Metrics>) -> Result<Option<String>> {
    metrics
        .map(|metrics| serde_json::to_string(metrics).map_err(StoreError::from))
        .transpose()
}

fn interaction_from_row(row: &rusqlite::Row<'_>) -> Result<Interaction> {
    let id_raw: String = row.get(0)?;
    let id = InteractionId::from_str(&id_raw).map_err(|_| StoreError::InvalidId(id_raw.clone()))?;
    let platform_raw: String = row.get(1)?;
    let platform = Platform::from_str(&platform_raw).map_err(|_| StoreError::InvalidColumn {
        column: "platform",
        value: platform_raw.clone(),
    })?;
    let metrics_raw: Option<String> = row.get(7)?;
    let metrics = match metrics_raw {
        Some(raw) => Some(serde_json::from_str::<Metrics>(&raw)?),
        None => None,
    };
    let status_raw: String = row.get(11)?;
    let status =
        InteractionStatus::from_str(&status_raw).map_err(|_| StoreError::InvalidColumn {
            column: "status",
            value: status_raw.clone(),
        })?;

    Ok(Interaction {
        id,
        platform,
        external_post_id: row.get(2)?,
        content: row.get(3)?,
        author_name: row.get(4)?,
        author_handle: row.get(5)?,
        url: row.get(6)?,
        metrics,
        media_url: row.get(8)?,
        tag: row.get(9)?,
        reply_text: row.get(10)?,
        status,
        created_at: row.get(12)?,
    })
}
