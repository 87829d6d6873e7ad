use serde::Serialize;
use serde_json::Value;
use sqlx::{FromRow, PgPool};

use crate::database::{DatabaseError, DatabaseManager};

/// Largest `n` accepted by the top-N rankings.
pub const MAX_TOP_N: i64 = 100;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RateRank {
    pub iid: i64,
    pub name: String,
    pub images: Option<Value>,
    pub sum: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AmountRank {
    pub id: i64,
    pub name: String,
    pub images: Option<Value>,
    pub cid: i64,
    pub cname: Option<String>,
    pub avg_rate: f64,
    pub sum_amount: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserOrders {
    pub id: i64,
    pub name: String,
    pub sum: i64,
    pub orders: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CatalogTrend {
    pub cid: i64,
    pub name: String,
    pub total_orders: i64,
    pub total_scores: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateCategory {
    Excellent,
    Good,
    Poor,
}

impl RateCategory {
    /// >= 7 excellent, [4, 7) good, below 4 poor
    pub fn classify(avg: f64) -> Self {
        if avg >= 7.0 {
            RateCategory::Excellent
        } else if avg >= 4.0 {
            RateCategory::Good
        } else {
            RateCategory::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateBucket {
    pub category: RateCategory,
    pub count: i64,
    pub percent: f64,
}

/// Bucket per-item averages; percentages are of `total_items`, one decimal.
pub fn rate_distribution(averages: &[f64], total_items: i64) -> Vec<RateBucket> {
    [RateCategory::Excellent, RateCategory::Good, RateCategory::Poor]
        .into_iter()
        .map(|category| {
            let count = averages.iter().filter(|avg| RateCategory::classify(**avg) == category).count() as i64;
            let percent = if total_items > 0 {
                (count as f64 / total_items as f64 * 1000.0).round() / 10.0
            } else {
                0.0
            };
            RateBucket {
                category,
                count,
                percent,
            }
        })
        .collect()
}

pub fn clamp_top_n(n: i64) -> i64 {
    n.clamp(1, MAX_TOP_N)
}

pub struct StatsService {
    pool: PgPool,
}

impl StatsService {
    pub async fn new() -> Result<Self, DatabaseError> {
        Ok(Self {
            pool: DatabaseManager::pool().await?,
        })
    }

    pub async fn top_rated_items(&self, eid: i64, n: i64) -> Result<Vec<RateRank>, DatabaseError> {
        let rows = sqlx::query_as::<_, RateRank>(
            "SELECT i.id AS iid, i.name, i.thumbnails AS images, t.sum
             FROM (SELECT iid, SUM(rate) AS sum FROM ex_rates WHERE eid = $1 GROUP BY iid) t
             JOIN ex_items i ON i.id = t.iid
             ORDER BY t.sum DESC, i.id
             LIMIT $2",
        )
        .bind(eid)
        .bind(clamp_top_n(n))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn top_ordered_items(&self, eid: i64, n: i64) -> Result<Vec<AmountRank>, DatabaseError> {
        let rows = sqlx::query_as::<_, AmountRank>(
            "SELECT i.id, i.name, i.images, i.cid, c.name AS cname,
                    COALESCE(r.avg_rate, 0)::DOUBLE PRECISION AS avg_rate,
                    COALESCE(a.total, 0)::BIGINT AS sum_amount
             FROM ex_items i
             LEFT JOIN ex_catalogs c ON c.id = i.cid AND c.eid = i.eid
             LEFT JOIN (SELECT iid, AVG(rate) AS avg_rate FROM ex_rates WHERE eid = $1 GROUP BY iid) r
                    ON r.iid = i.id
             LEFT JOIN (SELECT iid, SUM(amount) AS total FROM ex_amounts WHERE eid = $1 GROUP BY iid) a
                    ON a.iid = i.id
             WHERE i.eid = $1
             ORDER BY sum_amount DESC, i.id
             LIMIT $2",
        )
        .bind(eid)
        .bind(clamp_top_n(n))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn top_ordering_users(&self, eid: i64, n: i64) -> Result<Vec<UserOrders>, DatabaseError> {
        let rows = sqlx::query_as::<_, UserOrders>(
            "SELECT u.id, u.name,
                    COALESCE(SUM(a.amount), 0)::BIGINT AS sum,
                    COUNT(a.id) AS orders
             FROM ex_users u
             LEFT JOIN ex_amounts a ON a.uid = u.id AND a.eid = u.eid
             WHERE u.eid = $1
             GROUP BY u.id, u.name
             ORDER BY sum DESC, u.id
             LIMIT $2",
        )
        .bind(eid)
        .bind(clamp_top_n(n))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Histogram of per-item average ratings. `NotFound` when the exhibition has no items.
    pub async fn rate_distribution(&self, eid: i64) -> Result<Vec<RateBucket>, DatabaseError> {
        let total_items = self.items_total(eid).await?;
        if total_items == 0 {
            return Err(DatabaseError::NotFound("no items found".to_string()));
        }
        let averages: Vec<f64> =
            sqlx::query_scalar("SELECT AVG(rate)::DOUBLE PRECISION FROM ex_rates WHERE eid = $1 GROUP BY iid")
                .bind(eid)
                .fetch_all(&self.pool)
                .await?;
        Ok(rate_distribution(&averages, total_items))
    }

    pub async fn amount_total(&self, eid: i64) -> Result<i64, DatabaseError> {
        self.scalar("SELECT COALESCE(SUM(amount), 0)::BIGINT FROM ex_amounts WHERE eid = $1", eid)
            .await
    }

    pub async fn items_total(&self, eid: i64) -> Result<i64, DatabaseError> {
        self.scalar("SELECT COUNT(*) FROM ex_items WHERE eid = $1", eid).await
    }

    pub async fn users_total(&self, eid: i64) -> Result<i64, DatabaseError> {
        self.scalar("SELECT COUNT(*) FROM ex_users WHERE eid = $1", eid).await
    }

    async fn scalar(&self, sql: &str, eid: i64) -> Result<i64, DatabaseError> {
        let value: i64 = sqlx::query_scalar(sql).bind(eid).fetch_one(&self.pool).await?;
        Ok(value)
    }

    /// Number of items whose average rating is above `rate`.
    pub async fn items_rated_above(&self, eid: i64, rate: f64) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM (
                 SELECT iid FROM ex_rates WHERE eid = $1 GROUP BY iid HAVING AVG(rate) > $2
             ) t",
        )
        .bind(eid)
        .bind(rate)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Order and score totals per catalog, aggregated per item first.
    pub async fn catalog_trending(&self, eid: i64) -> Result<Vec<CatalogTrend>, DatabaseError> {
        let rows = sqlx::query_as::<_, CatalogTrend>(
            "SELECT i.cid, c.name,
                    COALESCE(SUM(a.total), 0)::BIGINT AS total_orders,
                    COALESCE(SUM(r.total), 0)::DOUBLE PRECISION AS total_scores
             FROM ex_items i
             JOIN ex_catalogs c ON c.id = i.cid AND c.eid = i.eid
             LEFT JOIN (SELECT iid, SUM(amount) AS total FROM ex_amounts WHERE eid = $1 GROUP BY iid) a
                    ON a.iid = i.id
             LEFT JOIN (SELECT iid, SUM(rate) AS total FROM ex_rates WHERE eid = $1 GROUP BY iid) r
                    ON r.iid = i.id
             WHERE i.eid = $1
             GROUP BY i.cid, c.name
             ORDER BY total_orders DESC, i.cid",
        )
        .bind(eid)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Amount rows per user. `NotFound` when the exhibition has no users.
    pub async fn orders_per_user(&self, eid: i64) -> Result<f64, DatabaseError> {
        let users = self.users_total(eid).await?;
        if users == 0 {
            return Err(DatabaseError::NotFound("no users found".to_string()));
        }
        let orders = self.scalar("SELECT COUNT(*) FROM ex_amounts WHERE eid = $1", eid).await?;
        Ok(orders as f64 / users as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_bucket_edges() {
        assert_eq!(RateCategory::classify(10.0), RateCategory::Excellent);
        assert_eq!(RateCategory::classify(7.0), RateCategory::Excellent);
        assert_eq!(RateCategory::classify(6.99), RateCategory::Good);
        assert_eq!(RateCategory::classify(4.0), RateCategory::Good);
        assert_eq!(RateCategory::classify(3.99), RateCategory::Poor);
        assert_eq!(RateCategory::classify(0.0), RateCategory::Poor);
    }

    #[test]
    fn one_item_per_bucket() {
        let buckets = rate_distribution(&[8.0, 5.0, 2.0], 3);
        assert_eq!(
            buckets,
            vec![
                RateBucket {
                    category: RateCategory::Excellent,
                    count: 1,
                    percent: 33.3
                },
                RateBucket {
                    category: RateCategory::Good,
                    count: 1,
                    percent: 33.3
                },
                RateBucket {
                    category: RateCategory::Poor,
                    count: 1,
                    percent: 33.3
                },
            ]
        );
    }

    #[test]
    fn unrated_items_count_toward_total() {
        let buckets = rate_distribution(&[9.0], 4);
        assert_eq!(buckets[0].count, 1);
        assert_eq!(buckets[0].percent, 25.0);
        assert_eq!(buckets[2].count, 0);
    }

    #[test]
    fn bucket_serializes_lowercase() {
        let value = serde_json::to_value(&rate_distribution(&[1.0], 1)[2]).unwrap();
        assert_eq!(value["category"], "poor");
        assert_eq!(value["percent"], 100.0);
    }

    #[test]
    fn top_n_is_clamped() {
        assert_eq!(clamp_top_n(0), 1);
        assert_eq!(clamp_top_n(-5), 1);
        assert_eq!(clamp_top_n(10), 10);
        assert_eq!(clamp_top_n(1000), MAX_TOP_N);
    }
}
