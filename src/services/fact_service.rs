use sqlx::PgPool;

use crate::database::models::{Amount, AmountInput, Comment, CommentInput, Rate, RateInput};
use crate::database::{DatabaseError, DatabaseManager, Repository};

/// Insert-or-update keyed on `(uid, iid, eid)`, only for items of the exhibition.
///
/// Binds: $1 eid, $2 uid, $3 iid, $4 value. Returns no row when the item is missing.
fn upsert_sql(table: &str, column: &str, insert_value: &str, update_value: &str) -> String {
    format!(
        "INSERT INTO {table} (eid, uid, iid, {column})
         SELECT $1::BIGINT, $2::BIGINT, $3::BIGINT, {insert_value}
         WHERE EXISTS (SELECT 1 FROM ex_items WHERE id = $3 AND eid = $1)
         ON CONFLICT (uid, iid, eid)
         DO UPDATE SET {column} = {update_value}, updated_at = NOW()
         RETURNING *"
    )
}

fn missing_item(iid: i64, eid: i64) -> DatabaseError {
    DatabaseError::NotFound(format!("item {} not found in exhibition {}", iid, eid))
}

pub struct FactService {
    pool: PgPool,
    rates: Repository<Rate>,
    amounts: Repository<Amount>,
}

impl FactService {
    pub async fn new() -> Result<Self, DatabaseError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self {
            rates: Repository::new("ex_rates", pool.clone()),
            amounts: Repository::new("ex_amounts", pool.clone()),
            pool,
        })
    }

    // Rates

    pub async fn upsert_rate(&self, uid: i64, eid: i64, input: RateInput) -> Result<Rate, DatabaseError> {
        if !(input.rate.is_finite() && input.rate > 0.0) {
            return Err(DatabaseError::Invalid("rate must be a positive number".to_string()));
        }
        let sql = upsert_sql("ex_rates", "rate", "$4::DOUBLE PRECISION", "EXCLUDED.rate");
        let row = sqlx::query_as::<_, Rate>(&sql)
            .bind(eid)
            .bind(uid)
            .bind(input.iid)
            .bind(input.rate)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| missing_item(input.iid, eid))?;
        tracing::debug!("User {} rated item {} with {} (row {})", uid, input.iid, row.rate, row.id);
        Ok(row)
    }

    pub async fn rate(&self, id: i64, eid: i64) -> Result<Rate, DatabaseError> {
        self.rates.select_404(id, Some(eid)).await
    }

    pub async fn my_rate(&self, uid: i64, iid: i64, eid: i64) -> Result<Rate, DatabaseError> {
        sqlx::query_as::<_, Rate>("SELECT * FROM ex_rates WHERE eid = $1 AND iid = $2 AND uid = $3")
            .bind(eid)
            .bind(iid)
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("no rate for item {}", iid)))
    }

    pub async fn my_rates(&self, uid: i64, eid: i64, iids: &[i64]) -> Result<Vec<Rate>, DatabaseError> {
        if iids.is_empty() {
            return Err(DatabaseError::Invalid("no input item ids".to_string()));
        }
        let rows = sqlx::query_as::<_, Rate>(
            "SELECT * FROM ex_rates WHERE eid = $1 AND uid = $2 AND iid = ANY($3) ORDER BY iid",
        )
        .bind(eid)
        .bind(uid)
        .bind(iids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn rate_total(&self, iid: i64, eid: i64) -> Result<f64, DatabaseError> {
        let sum: f64 = sqlx::query_scalar("SELECT COALESCE(SUM(rate), 0) FROM ex_rates WHERE eid = $1 AND iid = $2")
            .bind(eid)
            .bind(iid)
            .fetch_one(&self.pool)
            .await?;
        Ok(sum)
    }

    // Amounts

    /// A missing `amount` keeps the stored quantity (0 for a new row).
    pub async fn upsert_amount(&self, uid: i64, eid: i64, input: AmountInput) -> Result<Amount, DatabaseError> {
        if input.amount.is_some_and(|amount| amount < 0) {
            return Err(DatabaseError::Invalid("amount must not be negative".to_string()));
        }
        let sql = upsert_sql(
            "ex_amounts",
            "amount",
            "COALESCE($4::BIGINT, 0)",
            "COALESCE($4::BIGINT, ex_amounts.amount)",
        );
        let row = sqlx::query_as::<_, Amount>(&sql)
            .bind(eid)
            .bind(uid)
            .bind(input.iid)
            .bind(input.amount)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| missing_item(input.iid, eid))?;
        tracing::debug!("User {} ordered {} of item {} (row {})", uid, row.amount, input.iid, row.id);
        Ok(row)
    }

    pub async fn amount(&self, id: i64, eid: i64) -> Result<Amount, DatabaseError> {
        self.amounts.select_404(id, Some(eid)).await
    }

    pub async fn my_amount(&self, uid: i64, iid: i64, eid: i64) -> Result<Amount, DatabaseError> {
        sqlx::query_as::<_, Amount>("SELECT * FROM ex_amounts WHERE eid = $1 AND iid = $2 AND uid = $3")
            .bind(eid)
            .bind(iid)
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("no amount for item {}", iid)))
    }

    pub async fn amount_total(&self, iid: i64, eid: i64) -> Result<i64, DatabaseError> {
        let sum: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0)::BIGINT FROM ex_amounts WHERE eid = $1 AND iid = $2")
                .bind(eid)
                .bind(iid)
                .fetch_one(&self.pool)
                .await?;
        Ok(sum)
    }

    // Comments

    pub async fn upsert_comment(&self, uid: i64, eid: i64, input: CommentInput) -> Result<Comment, DatabaseError> {
        if input.content.trim().is_empty() {
            return Err(DatabaseError::Invalid("content must not be empty".to_string()));
        }
        let sql = upsert_sql("ex_comments", "content", "$4::TEXT", "EXCLUDED.content");
        let row = sqlx::query_as::<_, Comment>(&sql)
            .bind(eid)
            .bind(uid)
            .bind(input.iid)
            .bind(input.content)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| missing_item(input.iid, eid))?;
        Ok(row)
    }

    pub async fn comments(&self, iid: i64, eid: i64) -> Result<Vec<Comment>, DatabaseError> {
        let rows = sqlx::query_as::<_, Comment>(
            "SELECT * FROM ex_comments WHERE eid = $1 AND iid = $2 ORDER BY created_at DESC, id DESC",
        )
        .bind(eid)
        .bind(iid)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_targets_the_fact_key() {
        let sql = upsert_sql("ex_rates", "rate", "$4::DOUBLE PRECISION", "EXCLUDED.rate");
        assert!(sql.starts_with("INSERT INTO ex_rates (eid, uid, iid, rate)"));
        assert!(sql.contains("ON CONFLICT (uid, iid, eid)"));
        assert!(sql.contains("DO UPDATE SET rate = EXCLUDED.rate, updated_at = NOW()"));
        assert!(sql.trim_end().ends_with("RETURNING *"));
    }
}
