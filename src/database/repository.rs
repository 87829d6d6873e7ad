use sqlx::{postgres::PgRow, FromRow, PgPool, Postgres, QueryBuilder};

use crate::database::manager::DatabaseError;
use crate::database::update::{Patch, UpdateSet};

/// Id-addressed access to one table, optionally scoped to an exhibition.
pub struct Repository<T> {
    table_name: &'static str,
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table_name: &'static str, pool: PgPool) -> Self {
        Self {
            table_name,
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    fn scoped<'a>(&self, head: &str, id: i64, eid: Option<i64>) -> QueryBuilder<'a, Postgres> {
        let mut builder = QueryBuilder::new(format!("{} {} WHERE id = ", head, self.table_name));
        builder.push_bind(id);
        if let Some(eid) = eid {
            builder.push(" AND eid = ").push_bind(eid);
        }
        builder
    }

    pub async fn select_one(&self, id: i64, eid: Option<i64>) -> Result<Option<T>, DatabaseError> {
        let row = self
            .scoped("SELECT * FROM", id, eid)
            .build_query_as::<T>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn select_404(&self, id: i64, eid: Option<i64>) -> Result<T, DatabaseError> {
        self.select_one(id, eid)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} {} not found", self.table_name, id)))
    }

    pub async fn update_404(&self, id: i64, eid: Option<i64>, patch: impl Patch) -> Result<T, DatabaseError> {
        let mut set = UpdateSet::new(self.table_name);
        patch.apply(&mut set);
        let mut builder = set.finish(id, eid);
        builder
            .build_query_as::<T>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} {} not found", self.table_name, id)))
    }

    pub async fn delete_404(&self, id: i64, eid: Option<i64>) -> Result<(), DatabaseError> {
        let result = self
            .scoped("DELETE FROM", id, eid)
            .build()
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("{} {} not found", self.table_name, id)));
        }
        Ok(())
    }
}
