//! Catalog forest traversal.
//!
//! Every walk carries the ids it has already visited and stops after
//! `max_hops` steps, so a corrupt parent chain (cycle or very long run)
//! ends the query instead of looping.

use sqlx::PgExecutor;

use crate::database::manager::DatabaseError;
use crate::database::models::{Catalog, CatalogNode};

// Upward walk from $1. `hops` is the distance from the start node.
const WALK_UP: &str = r#"
WITH RECURSIVE up AS (
    SELECT c.*, 0 AS hops, ARRAY[c.id] AS visited
    FROM ex_catalogs c
    WHERE c.id = $1 AND c.eid = $2
  UNION ALL
    SELECT p.*, up.hops + 1, up.visited || p.id
    FROM ex_catalogs p
    JOIN up ON p.id = up.pid AND p.eid = up.eid
    WHERE up.pid <> 0
      AND up.hops < $3
      AND NOT p.id = ANY(up.visited)
)
"#;

// Downward walk from $1. `depth` is the distance from the start node.
const WALK_DOWN: &str = r#"
WITH RECURSIVE down AS (
    SELECT c.*, 0 AS depth, ARRAY[c.id] AS visited
    FROM ex_catalogs c
    WHERE c.id = $1 AND c.eid = $2
  UNION ALL
    SELECT k.*, down.depth + 1, down.visited || k.id
    FROM ex_catalogs k
    JOIN down ON k.pid = down.id AND k.eid = down.eid
    WHERE down.depth < $3
      AND NOT k.id = ANY(down.visited)
)
"#;

fn hop_bound(max_hops: u32) -> i32 {
    i32::try_from(max_hops).unwrap_or(i32::MAX)
}

/// Topmost ancestor of `id` (the node itself when it is a root).
///
/// `None` when the node is missing or its chain breaks before reaching `pid = 0`.
pub async fn root<'e, E>(executor: E, id: i64, eid: i64, max_hops: u32) -> Result<Option<Catalog>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{} SELECT * FROM up WHERE pid = 0 ORDER BY hops LIMIT 1", WALK_UP);
    let row = sqlx::query_as::<_, Catalog>(&sql)
        .bind(id)
        .bind(eid)
        .bind(hop_bound(max_hops))
        .fetch_optional(executor)
        .await?;
    Ok(row)
}

/// Ancestor chain of `id`, root first and `id` last, ordered by distance.
pub async fn path<'e, E>(executor: E, id: i64, eid: i64, max_hops: u32) -> Result<Vec<Catalog>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{} SELECT * FROM up ORDER BY hops DESC", WALK_UP);
    let rows = sqlx::query_as::<_, Catalog>(&sql)
        .bind(id)
        .bind(eid)
        .bind(hop_bound(max_hops))
        .fetch_all(executor)
        .await?;
    Ok(rows)
}

/// `id` and every descendant at most `depth` levels below it, shallowest first.
pub async fn subtree<'e, E>(executor: E, id: i64, eid: i64, depth: u32) -> Result<Vec<CatalogNode>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{} SELECT * FROM down ORDER BY depth, id", WALK_DOWN);
    let rows = sqlx::query_as::<_, CatalogNode>(&sql)
        .bind(id)
        .bind(eid)
        .bind(hop_bound(depth))
        .fetch_all(executor)
        .await?;
    Ok(rows)
}

/// Ids of `id` and everything under it.
pub async fn descendant_ids<'e, E>(executor: E, id: i64, eid: i64, max_hops: u32) -> Result<Vec<i64>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{} SELECT id FROM down", WALK_DOWN);
    let ids = sqlx::query_scalar::<_, i64>(&sql)
        .bind(id)
        .bind(eid)
        .bind(hop_bound(max_hops))
        .fetch_all(executor)
        .await?;
    Ok(ids)
}

/// Ids of `id` and everything under it, or `Invalid` when the subtree runs
/// deeper than `max_hops` and the walk could not see all of it.
pub async fn whole_subtree_ids<'e, E>(executor: E, id: i64, eid: i64, max_hops: u32) -> Result<Vec<i64>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{} SELECT id, depth FROM down", WALK_DOWN);
    let rows = sqlx::query_as::<_, (i64, i32)>(&sql)
        .bind(id)
        .bind(eid)
        .bind(hop_bound(max_hops.saturating_add(1)))
        .fetch_all(executor)
        .await?;
    within_bound(id, rows, max_hops)
}

fn within_bound(id: i64, rows: Vec<(i64, i32)>, max_hops: u32) -> Result<Vec<i64>, DatabaseError> {
    if rows.iter().any(|(_, depth)| i64::from(*depth) > i64::from(max_hops)) {
        return Err(DatabaseError::Invalid(format!(
            "catalog {} has descendants deeper than {} levels",
            id, max_hops
        )));
    }
    Ok(rows.into_iter().map(|(id, _)| id).collect())
}

/// `root_id` to store on a node, and the root id its descendants carry.
///
/// `parent_root` is the root reached from the node's parent, `None` for a root node.
pub fn root_ids(node_id: i64, parent_root: Option<i64>) -> (i64, i64) {
    match parent_root {
        None => (0, node_id),
        Some(top) => (top, top),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_node_stores_zero_and_roots_its_subtree() {
        assert_eq!(root_ids(7, None), (0, 7));
    }

    #[test]
    fn child_inherits_parent_root() {
        assert_eq!(root_ids(9, Some(1)), (1, 1));
        // parent that is itself a root resolves to its own id
        assert_eq!(root_ids(9, Some(4)), (4, 4));
    }

    #[test]
    fn subtree_past_the_bound_is_refused() {
        let rows = vec![(1, 0), (2, 1), (3, 2)];
        assert_eq!(within_bound(1, rows.clone(), 2).unwrap(), vec![1, 2, 3]);
        assert!(matches!(within_bound(1, rows, 1), Err(DatabaseError::Invalid(_))));
        assert_eq!(within_bound(1, vec![(1, 0)], 0).unwrap(), vec![1]);
    }

    #[test]
    fn hop_bound_saturates() {
        assert_eq!(hop_bound(64), 64);
        assert_eq!(hop_bound(u32::MAX), i32::MAX);
    }
}
