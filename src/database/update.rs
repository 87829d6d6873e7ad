use sqlx::{Encode, Postgres, QueryBuilder, Type};

/// Partial update payload: one optional per mutable column.
pub trait Patch {
    /// Push every present field onto the SET list
    fn apply(self, set: &mut UpdateSet<'_>);
}

/// Builds `UPDATE <table> SET <present columns>, updated_at = NOW() WHERE id = $n [AND eid = $m] RETURNING *`.
///
/// Columns whose value is `None` are left out, so only fields present in the
/// request body change.
pub struct UpdateSet<'a> {
    builder: QueryBuilder<'a, Postgres>,
    columns: usize,
}

impl<'a> UpdateSet<'a> {
    pub fn new(table: &str) -> Self {
        Self {
            builder: QueryBuilder::new(format!("UPDATE {} SET ", table)),
            columns: 0,
        }
    }

    pub fn set<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'a + Encode<'a, Postgres> + Type<Postgres> + Send,
    {
        if let Some(value) = value {
            if self.columns > 0 {
                self.builder.push(", ");
            }
            self.builder.push(column).push(" = ").push_bind(value);
            self.columns += 1;
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.columns == 0
    }

    /// Close the statement; `eid` scopes the row to one exhibition when given.
    pub fn finish(mut self, id: i64, eid: Option<i64>) -> QueryBuilder<'a, Postgres> {
        if self.columns > 0 {
            self.builder.push(", ");
        }
        self.builder.push("updated_at = NOW() WHERE id = ").push_bind(id);
        if let Some(eid) = eid {
            self.builder.push(" AND eid = ").push_bind(eid);
        }
        self.builder.push(" RETURNING *");
        self.builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_present_columns_are_set() {
        let mut set = UpdateSet::new("ex_items");
        set.set("name", Some("lamp".to_string()))
            .set::<String>("description", None)
            .set("cid", Some(4_i64));
        assert!(!set.is_empty());

        let builder = set.finish(9, Some(2));
        assert_eq!(
            builder.sql(),
            "UPDATE ex_items SET name = $1, cid = $2, updated_at = NOW() WHERE id = $3 AND eid = $4 RETURNING *"
        );
    }

    #[test]
    fn empty_patch_still_touches_row() {
        let set = UpdateSet::new("exhibitions");
        assert!(set.is_empty());
        let builder = set.finish(1, None);
        assert_eq!(
            builder.sql(),
            "UPDATE exhibitions SET updated_at = NOW() WHERE id = $1 RETURNING *"
        );
    }
}
