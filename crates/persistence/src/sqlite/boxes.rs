//! Reward box persistence and issuance bookkeeping

use chrono::{DateTime, Utc};
use lootinyang_core::{BoxTier, Error, Item, OpenBoxOutcome, Result, RewardBox};
use serde::{Deserialize, Serialize};
use sqlx::{Acquire, Executor, Sqlite, SqlitePool};
use tracing::debug;

/// Database row for reward box
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RewardBoxRow {
    id: i64,
    user_id: String,
    tier: String,
    opened: bool,
    items: String,
    created_at: DateTime<Utc>,
    opened_at: Option<DateTime<Utc>>,
}

impl TryFrom<RewardBoxRow> for RewardBox {
    type Error = Error;

    fn try_from(row: RewardBoxRow) -> Result<Self> {
        let items: Vec<Item> = serde_json::from_str(&row.items)?;
        Ok(RewardBox {
            id: row.id,
            user_id: row.user_id,
            tier: row.tier.parse()?,
            opened: row.opened,
            items,
            created_at: row.created_at,
            opened_at: row.opened_at,
        })
    }
}

/// Marks that a box of `tier` was issued to a user for a period
/// (a day, an ISO week, a month) so it is issued only once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RewardIssuance {
    pub user_id: String,
    pub tier: String,
    pub period_key: String,
    pub box_id: i64,
}

pub(crate) const BOX_COLUMNS: &str = "id, user_id, tier, opened, items, created_at, opened_at";

/// Create a new unopened box
pub async fn create_reward_box(
    pool: &SqlitePool,
    user_id: &str,
    tier: BoxTier,
    created_at: DateTime<Utc>,
) -> Result<RewardBox> {
    let result = sqlx::query(
        "INSERT INTO reward_boxes (user_id, tier, opened, items, created_at) VALUES (?, ?, 0, '[]', ?)",
    )
    .bind(user_id)
    .bind(tier.as_str())
    .bind(created_at)
    .execute(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(RewardBox::new(result.last_insert_rowid(), user_id, tier, created_at))
}

/// Create a box for `(tier, period_key)` unless one was already issued.
///
/// Returns `None` when the period's box exists already. Accepts a pool or a
/// connection that is already inside a transaction; in the latter case the
/// work runs under a savepoint.
pub async fn issue_reward_box<'a, A>(
    conn: A,
    user_id: &str,
    tier: BoxTier,
    period_key: &str,
    created_at: DateTime<Utc>,
) -> Result<Option<RewardBox>>
where
    A: Acquire<'a, Database = Sqlite>,
{
    let mut tx = conn
        .begin()
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    // Write first so the transaction holds the write lock before it reads
    let result = sqlx::query(
        "INSERT INTO reward_boxes (user_id, tier, opened, items, created_at) VALUES (?, ?, 0, '[]', ?)",
    )
    .bind(user_id)
    .bind(tier.as_str())
    .bind(created_at)
    .execute(&mut *tx)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;
    let box_id = result.last_insert_rowid();

    let claimed = sqlx::query(
        "INSERT OR IGNORE INTO reward_issuance (user_id, tier, period_key, box_id) VALUES (?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(tier.as_str())
    .bind(period_key)
    .bind(box_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    if claimed.rows_affected() == 0 {
        debug!(user_id, %tier, period_key, "box already issued for period");
        tx.rollback()
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;
        return Ok(None);
    }

    tx.commit()
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(Some(RewardBox::new(box_id, user_id, tier, created_at)))
}

/// Get a box by ID
pub async fn get_reward_box(pool: &SqlitePool, id: i64) -> Result<Option<RewardBox>> {
    let row: Option<RewardBoxRow> =
        sqlx::query_as(&format!("SELECT {} FROM reward_boxes WHERE id = ?", BOX_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

    row.map(RewardBox::try_from).transpose()
}

/// List a user's boxes, newest first
pub async fn list_reward_boxes(pool: &SqlitePool, user_id: &str, only_unopened: bool) -> Result<Vec<RewardBox>> {
    let sql = if only_unopened {
        format!(
            "SELECT {} FROM reward_boxes WHERE user_id = ? AND opened = 0 ORDER BY id DESC",
            BOX_COLUMNS
        )
    } else {
        format!("SELECT {} FROM reward_boxes WHERE user_id = ? ORDER BY id DESC", BOX_COLUMNS)
    };

    let rows: Vec<RewardBoxRow> = sqlx::query_as(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    rows.into_iter().map(RewardBox::try_from).collect()
}

/// Open a box with the given items.
///
/// The items and the opened flag are written by one conditional update, so
/// a box can only ever be opened once; a losing second attempt gets
/// `AlreadyOpened`.
pub async fn open_reward_box(
    pool: &SqlitePool,
    id: i64,
    items: &[Item],
    opened_at: DateTime<Utc>,
) -> Result<OpenBoxOutcome> {
    let items_json = serde_json::to_string(items)?;

    let result = sqlx::query(
        "UPDATE reward_boxes SET opened = 1, items = ?, opened_at = ? WHERE id = ? AND opened = 0",
    )
    .bind(&items_json)
    .bind(opened_at)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    let current = get_reward_box(pool, id).await?;

    Ok(match current {
        None => OpenBoxOutcome::NotFound { box_id: id },
        Some(reward_box) if result.rows_affected() > 0 => OpenBoxOutcome::Opened(reward_box),
        Some(reward_box) => OpenBoxOutcome::AlreadyOpened {
            box_id: reward_box.id,
            opened_at: reward_box.opened_at,
        },
    })
}

/// Count the boxes a user has opened
pub async fn count_opened_boxes<'e, E>(executor: E, user_id: &str) -> Result<u32>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM reward_boxes WHERE user_id = ? AND opened = 1")
            .bind(user_id)
            .fetch_one(executor)
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(count.0 as u32)
}
