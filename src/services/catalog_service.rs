use sqlx::PgPool;

use crate::config;
use crate::database::hierarchy;
use crate::database::models::{Catalog, CatalogNode, CatalogPatch, NewCatalog};
use crate::database::{DatabaseError, DatabaseManager, Patch, Repository, UpdateSet};

pub struct CatalogService {
    pool: PgPool,
    repo: Repository<Catalog>,
    max_depth: u32,
}

impl CatalogService {
    pub async fn new() -> Result<Self, DatabaseError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self {
            repo: Repository::new("ex_catalogs", pool.clone()),
            max_depth: config::config().catalog.max_depth,
            pool,
        })
    }

    pub async fn list(&self, eid: i64) -> Result<Vec<Catalog>, DatabaseError> {
        let rows = sqlx::query_as::<_, Catalog>("SELECT * FROM ex_catalogs WHERE eid = $1 ORDER BY id DESC")
            .bind(eid)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get(&self, id: i64, eid: i64) -> Result<Catalog, DatabaseError> {
        self.repo.select_404(id, Some(eid)).await
    }

    /// Root id reachable from `pid`, `None` when `pid` is 0.
    async fn parent_root(&self, pid: i64, eid: i64) -> Result<Option<i64>, DatabaseError> {
        if pid == 0 {
            return Ok(None);
        }
        self.repo
            .select_one(pid, Some(eid))
            .await?
            .ok_or_else(|| DatabaseError::Invalid(format!("parent catalog {} not found", pid)))?;
        let root = hierarchy::root(&self.pool, pid, eid, self.max_depth)
            .await?
            .ok_or_else(|| DatabaseError::Invalid(format!("parent catalog {} has no reachable root", pid)))?;
        Ok(Some(root.id))
    }

    pub async fn create(&self, eid: i64, input: NewCatalog) -> Result<Catalog, DatabaseError> {
        let (root_id, _) = hierarchy::root_ids(0, self.parent_root(input.pid, eid).await?);

        let row = sqlx::query_as::<_, Catalog>(
            "INSERT INTO ex_catalogs
                (pid, eid, name, name_en, title, description, images, videos, banner, root_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING *",
        )
        .bind(input.pid)
        .bind(eid)
        .bind(input.name)
        .bind(input.name_en)
        .bind(input.title)
        .bind(input.description)
        .bind(input.images)
        .bind(input.videos)
        .bind(input.banner)
        .bind(root_id)
        .fetch_one(&self.pool)
        .await?;
        tracing::debug!("Created catalog {} under {} (root {})", row.id, row.pid, row.root_id);
        Ok(row)
    }

    /// Partial update. A new `pid` moves the whole subtree and rewrites its `root_id`s.
    pub async fn update(&self, id: i64, eid: i64, patch: CatalogPatch) -> Result<Catalog, DatabaseError> {
        let current = self.repo.select_404(id, Some(eid)).await?;
        let new_pid = match patch.pid {
            Some(pid) if pid != current.pid => pid,
            _ => return self.repo.update_404(id, Some(eid), patch).await,
        };

        let parent_root = self.parent_root(new_pid, eid).await?;

        let mut tx = self.pool.begin().await?;

        let subtree = hierarchy::whole_subtree_ids(&mut *tx, id, eid, self.max_depth).await?;
        if new_pid == id || subtree.contains(&new_pid) {
            return Err(DatabaseError::Invalid(format!(
                "catalog {} cannot move under its own subtree ({})",
                id, new_pid
            )));
        }
        let (root_id, subtree_root) = hierarchy::root_ids(id, parent_root);

        let mut set = UpdateSet::new("ex_catalogs");
        set.set("pid", Some(new_pid)).set("root_id", Some(root_id));
        patch.apply(&mut set);
        let updated = set
            .finish(id, Some(eid))
            .build_query_as::<Catalog>()
            .fetch_one(&mut *tx)
            .await?;

        let moved = sqlx::query(
            "UPDATE ex_catalogs SET root_id = $1, updated_at = NOW()
             WHERE eid = $2 AND id = ANY($3) AND id <> $4",
        )
        .bind(subtree_root)
        .bind(eid)
        .bind(&subtree)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(
            "Moved catalog {} from {} to {}; {} descendants now rooted at {}",
            id,
            current.pid,
            new_pid,
            moved.rows_affected(),
            subtree_root
        );
        Ok(updated)
    }

    pub async fn delete(&self, id: i64, eid: i64) -> Result<(), DatabaseError> {
        self.repo.delete_404(id, Some(eid)).await
    }

    pub async fn root(&self, id: i64, eid: i64) -> Result<Catalog, DatabaseError> {
        hierarchy::root(&self.pool, id, eid, self.max_depth)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("no root reachable from catalog {}", id)))
    }

    pub async fn path(&self, id: i64, eid: i64) -> Result<Vec<Catalog>, DatabaseError> {
        let path = hierarchy::path(&self.pool, id, eid, self.max_depth).await?;
        if path.is_empty() {
            return Err(DatabaseError::NotFound(format!("ex_catalogs {} not found", id)));
        }
        Ok(path)
    }

    /// Node plus descendants up to `depth` levels, clamped to the configured bound.
    pub async fn subtree(&self, id: i64, eid: i64, depth: Option<u32>) -> Result<Vec<CatalogNode>, DatabaseError> {
        let depth = clamp_depth(depth, &config::config().catalog);
        let nodes = hierarchy::subtree(&self.pool, id, eid, depth).await?;
        if nodes.is_empty() {
            return Err(DatabaseError::NotFound(format!("ex_catalogs {} not found", id)));
        }
        Ok(nodes)
    }

    /// `cid` and every catalog below it.
    pub async fn scope(&self, cid: i64, eid: i64) -> Result<Vec<i64>, DatabaseError> {
        hierarchy::descendant_ids(&self.pool, cid, eid, self.max_depth).await
    }
}

fn clamp_depth(depth: Option<u32>, settings: &config::CatalogConfig) -> u32 {
    depth.unwrap_or(settings.default_subtree_depth).min(settings.max_depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtree_depth_defaults_and_clamps() {
        let settings = config::CatalogConfig {
            max_depth: 8,
            default_subtree_depth: 1,
        };
        assert_eq!(clamp_depth(None, &settings), 1);
        assert_eq!(clamp_depth(Some(0), &settings), 0);
        assert_eq!(clamp_depth(Some(3), &settings), 3);
        assert_eq!(clamp_depth(Some(500), &settings), 8);
    }
}
