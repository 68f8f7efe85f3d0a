/*
 * Responsibility
 * - texts テーブル向け SQLx 操作 (owner-scoped)
 * - 全ての query は owner (user_uid) で絞り込む。値は必ず bind する
 * - DB エラーは RepoError に変換して返す
 */
use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};

use crate::repos::error::RepoResult;

/// A stored text record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub id: u64,
    pub body: String,
    pub info: String,
    pub owner: u64,
}

/// Owner-scoped persistence for texts.
///
/// Every method takes the acting owner's uid; rows belonging to anyone else
/// are neither returned nor modified.
#[async_trait]
pub trait TextRepository: Send + Sync {
    /// All texts owned by `owner`, in insertion order.
    async fn list_by_owner(&self, owner: u64) -> RepoResult<Vec<Text>>;

    /// Insert a new text and return its store-assigned id.
    async fn insert(&self, body: &str, info: &str, owner: u64) -> RepoResult<u64>;

    /// Overwrite body/info of the row matching both `id` and `owner`.
    ///
    /// Returns the number of affected rows (0 or 1).
    async fn update_owned(&self, id: u64, body: &str, info: &str, owner: u64) -> RepoResult<u64>;
}

#[derive(Debug, FromRow)]
struct TextRow {
    id: i64,
    #[sqlx(rename = "text")]
    body: String,
    info: String,
    user_uid: i64,
}

impl From<TextRow> for Text {
    fn from(row: TextRow) -> Self {
        Self {
            // AUTOINCREMENT ids are always positive
            id: row.id as u64,
            body: row.body,
            info: row.info,
            owner: owner_from_column(row.user_uid),
        }
    }
}

// user_uid stores the u64 uid as its i64 bit pattern so the full range round-trips.
fn owner_to_column(owner: u64) -> i64 {
    owner as i64
}

fn owner_from_column(value: i64) -> u64 {
    value as u64
}

#[derive(Clone, Debug)]
pub struct SqliteTextRepository {
    pool: SqlitePool,
}

impl SqliteTextRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TextRepository for SqliteTextRepository {
    async fn list_by_owner(&self, owner: u64) -> RepoResult<Vec<Text>> {
        let rows = sqlx::query_as::<_, TextRow>(
            r#"
            SELECT id, text, info, user_uid
            FROM texts
            WHERE user_uid = ?
            ORDER BY id ASC
            "#,
        )
        .bind(owner_to_column(owner))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Text::from).collect())
    }

    async fn insert(&self, body: &str, info: &str, owner: u64) -> RepoResult<u64> {
        let done = sqlx::query(
            r#"
            INSERT INTO texts (text, info, user_uid)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(body)
        .bind(info)
        .bind(owner_to_column(owner))
        .execute(&self.pool)
        .await?;

        Ok(done.last_insert_rowid() as u64)
    }

    async fn update_owned(&self, id: u64, body: &str, info: &str, owner: u64) -> RepoResult<u64> {
        // Larger ids were never assigned by the store.
        let Ok(id) = i64::try_from(id) else {
            return Ok(0);
        };

        let done = sqlx::query(
            r#"
            UPDATE texts
            SET text = ?,
                info = ?
            WHERE id = ?
                AND user_uid = ?
            "#,
        )
        .bind(body)
        .bind(info)
        .bind(id)
        .bind(owner_to_column(owner))
        .execute(&self.pool)
        .await?;

        Ok(done.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{PoolSettings, create_pool, run_migrations};

    async fn repo() -> SqliteTextRepository {
        let pool = create_pool("sqlite::memory:", PoolSettings::default())
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteTextRepository::new(pool)
    }

    #[tokio::test]
    async fn list_of_unknown_owner_is_empty() {
        let repo = repo().await;
        assert!(repo.list_by_owner(7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn inserted_text_is_listed_for_its_owner() {
        let repo = repo().await;
        let id = repo.insert("hello", "note", 42).await.unwrap();

        let texts = repo.list_by_owner(42).await.unwrap();
        assert_eq!(
            texts,
            vec![Text {
                id,
                body: "hello".into(),
                info: "note".into(),
                owner: 42,
            }]
        );
    }

    #[tokio::test]
    async fn ids_are_unique_and_listing_follows_insertion_order() {
        let repo = repo().await;
        let first = repo.insert("a", "", 1).await.unwrap();
        let second = repo.insert("b", "", 1).await.unwrap();
        let third = repo.insert("c", "", 2).await.unwrap();

        assert!(first < second && second < third);
        let ids: Vec<u64> = repo
            .list_by_owner(1)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[tokio::test]
    async fn texts_of_other_owners_are_invisible() {
        let repo = repo().await;
        repo.insert("mine", "", 1).await.unwrap();

        assert!(repo.list_by_owner(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_by_other_owner_affects_nothing() {
        let repo = repo().await;
        let id = repo.insert("hello", "note", 42).await.unwrap();

        let affected = repo.update_owned(id, "x", "", 99).await.unwrap();
        assert_eq!(affected, 0);

        let texts = repo.list_by_owner(42).await.unwrap();
        assert_eq!(texts[0].body, "hello");
        assert_eq!(texts[0].info, "note");
    }

    #[tokio::test]
    async fn update_by_owner_overwrites_body_and_info() {
        let repo = repo().await;
        let id = repo.insert("hello", "note", 42).await.unwrap();

        assert_eq!(repo.update_owned(id, "bye", "", 42).await.unwrap(), 1);

        let texts = repo.list_by_owner(42).await.unwrap();
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].id, id);
        assert_eq!(texts[0].body, "bye");
        assert_eq!(texts[0].info, "");
    }

    #[tokio::test]
    async fn repeated_update_leaves_same_state() {
        let repo = repo().await;
        let id = repo.insert("hello", "note", 42).await.unwrap();

        repo.update_owned(id, "b2", "i2", 42).await.unwrap();
        let once = repo.list_by_owner(42).await.unwrap();
        repo.update_owned(id, "b2", "i2", 42).await.unwrap();
        let twice = repo.list_by_owner(42).await.unwrap();

        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn update_of_missing_or_out_of_range_id_affects_nothing() {
        let repo = repo().await;
        repo.insert("hello", "", 42).await.unwrap();

        assert_eq!(repo.update_owned(1000, "x", "", 42).await.unwrap(), 0);
        assert_eq!(repo.update_owned(u64::MAX, "x", "", 42).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn sql_in_user_text_is_stored_verbatim() {
        let repo = repo().await;
        let body = "'); DELETE FROM texts; --";
        let info = "\" OR 1=1 --";
        repo.insert("keep me", "", 2).await.unwrap();
        repo.insert(body, info, 1).await.unwrap();

        let texts = repo.list_by_owner(1).await.unwrap();
        assert_eq!(texts[0].body, body);
        assert_eq!(texts[0].info, info);
        assert_eq!(repo.list_by_owner(2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn owners_above_i64_max_round_trip() {
        let repo = repo().await;
        let owner = u64::MAX - 1;
        let id = repo.insert("big", "", owner).await.unwrap();

        let texts = repo.list_by_owner(owner).await.unwrap();
        assert_eq!(texts[0].owner, owner);
        assert_eq!(repo.update_owned(id, "bigger", "", owner).await.unwrap(), 1);
        assert!(repo.list_by_owner(u64::MAX).await.unwrap().is_empty());
    }
}
