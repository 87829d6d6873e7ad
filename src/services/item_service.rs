use sqlx::PgPool;

use crate::database::models::{Item, ItemPatch, ItemSummary, NewItem};
use crate::database::{DatabaseError, DatabaseManager, Repository};
use crate::services::{like_pattern, CatalogService};

pub struct ItemService {
    pool: PgPool,
    repo: Repository<Item>,
}

impl ItemService {
    pub async fn new() -> Result<Self, DatabaseError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self {
            repo: Repository::new("ex_items", pool.clone()),
            pool,
        })
    }

    /// Items with catalog name and fact aggregates.
    ///
    /// A positive `cid` limits the listing to that catalog and everything below it.
    pub async fn list(&self, eid: i64, q: Option<&str>, cid: Option<i64>) -> Result<Vec<ItemSummary>, DatabaseError> {
        let scope = match cid.filter(|cid| *cid > 0) {
            Some(cid) => Some(CatalogService::new().await?.scope(cid, eid).await?),
            None => None,
        };

        let rows = sqlx::query_as::<_, ItemSummary>(
            "SELECT i.*, c.name AS cname, r.avg_rate, a.sum_amount
             FROM ex_items i
             LEFT JOIN ex_catalogs c ON c.id = i.cid AND c.eid = i.eid
             LEFT JOIN (SELECT iid, AVG(rate) AS avg_rate FROM ex_rates WHERE eid = $1 GROUP BY iid) r
                    ON r.iid = i.id
             LEFT JOIN (SELECT iid, SUM(amount)::BIGINT AS sum_amount FROM ex_amounts WHERE eid = $1 GROUP BY iid) a
                    ON a.iid = i.id
             WHERE i.eid = $1
               AND ($2::BIGINT[] IS NULL OR i.cid = ANY($2))
               AND ($3::TEXT IS NULL OR i.name ILIKE $3 OR i.description ILIKE $3)
             ORDER BY i.id DESC",
        )
        .bind(eid)
        .bind(scope)
        .bind(like_pattern(q))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get(&self, id: i64, eid: i64) -> Result<Item, DatabaseError> {
        self.repo.select_404(id, Some(eid)).await
    }

    async fn check_catalog(&self, cid: i64, eid: i64) -> Result<(), DatabaseError> {
        if cid == 0 {
            return Ok(());
        }
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM ex_catalogs WHERE id = $1 AND eid = $2)")
            .bind(cid)
            .bind(eid)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Err(DatabaseError::Invalid(format!(
                "catalog {} does not exist in exhibition {}",
                cid, eid
            )));
        }
        Ok(())
    }

    pub async fn create(&self, eid: i64, input: NewItem) -> Result<Item, DatabaseError> {
        if input.name.trim().is_empty() {
            return Err(DatabaseError::Invalid("name must not be empty".to_string()));
        }
        self.check_catalog(input.cid, eid).await?;

        let row = sqlx::query_as::<_, Item>(
            "INSERT INTO ex_items (eid, cid, name, description, thumbnails, images, videos)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(eid)
        .bind(input.cid)
        .bind(input.name)
        .bind(input.description)
        .bind(input.thumbnails)
        .bind(input.images)
        .bind(input.videos)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, id: i64, eid: i64, patch: ItemPatch) -> Result<Item, DatabaseError> {
        if let Some(cid) = patch.cid {
            self.check_catalog(cid, eid).await?;
        }
        self.repo.update_404(id, Some(eid), patch).await
    }

    pub async fn delete(&self, id: i64, eid: i64) -> Result<(), DatabaseError> {
        self.repo.delete_404(id, Some(eid)).await
    }
}
