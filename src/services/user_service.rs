use std::io::Cursor;

use calamine::{open_workbook_from_rs, Reader, Xlsx};
use rand::{distributions::Uniform, Rng};
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::auth::{hash_password, verify_password};
use crate::database::models::{NewUser, User, UserPatch};
use crate::database::{DatabaseError, DatabaseManager, Repository};
use crate::services::like_pattern;

/// Password given to generated accounts.
pub const DEFAULT_PASSWORD: &str = "0000";

/// Largest batch `PUT users` will expand.
pub const MAX_BATCH_USERS: usize = 1000;

const TEMPLATE_SHEET: &str = "Sheet 1";
const TEMPLATE_HEADER_ROWS: usize = 2;

#[derive(Debug, Clone, Deserialize)]
pub struct BatchUserInput {
    pub name_prefix: String,
    pub index_range: [i64; 2],
}

/// One account row read from an uploaded template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRow {
    pub index: usize,
    pub name: String,
    pub title: String,
    pub mobile: String,
}

struct GeneratedUser {
    uname: String,
    name: String,
    title: String,
    mobile: String,
}

pub struct UserService {
    pool: PgPool,
    repo: Repository<User>,
}

impl UserService {
    pub async fn new() -> Result<Self, DatabaseError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self {
            repo: Repository::new("ex_users", pool.clone()),
            pool,
        })
    }

    pub async fn list(&self, eid: i64, q: Option<&str>) -> Result<Vec<User>, DatabaseError> {
        let rows = sqlx::query_as::<_, User>(
            "SELECT * FROM ex_users
             WHERE eid = $1
               AND ($2::TEXT IS NULL OR name ILIKE $2 OR title ILIKE $2 OR uname ILIKE $2 OR mobile ILIKE $2)
             ORDER BY id DESC",
        )
        .bind(eid)
        .bind(like_pattern(q))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get(&self, id: i64, eid: i64) -> Result<User, DatabaseError> {
        self.repo.select_404(id, Some(eid)).await
    }

    pub async fn find_by_uname(&self, uname: &str) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, User>("SELECT * FROM ex_users WHERE uname = $1")
            .bind(uname)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Check login credentials; `None` for unknown name or wrong password.
    pub async fn authenticate(&self, uname: &str, password: &str) -> Result<Option<User>, DatabaseError> {
        let user = match self.find_by_uname(uname).await? {
            Some(user) => user,
            None => return Ok(None),
        };
        if !verify_password(password, &user.password) {
            return Ok(None);
        }
        Ok(Some(user))
    }

    pub async fn create(&self, eid: i64, input: NewUser) -> Result<User, DatabaseError> {
        if input.uname.trim().is_empty() {
            return Err(DatabaseError::Invalid("uname must not be empty".to_string()));
        }
        if input.password.is_empty() {
            return Err(DatabaseError::Invalid("password must not be empty".to_string()));
        }
        let password = hash(&input.password)?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO ex_users (eid, name, uname, password, title, mobile)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(eid)
        .bind(input.name)
        .bind(input.uname)
        .bind(password)
        .bind(input.title)
        .bind(input.mobile)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!("Created user {} ({}) in exhibition {}", user.id, user.uname, eid);
        Ok(user)
    }

    /// Accounts `prefix{i}` for every i in the range, in one statement.
    pub async fn create_batch(&self, eid: i64, input: BatchUserInput) -> Result<Vec<User>, DatabaseError> {
        let accounts = batch_usernames(&input.name_prefix, input.index_range)?
            .into_iter()
            .map(|uname| GeneratedUser {
                name: uname.clone(),
                uname,
                title: String::new(),
                mobile: String::new(),
            })
            .collect();
        self.insert_generated(eid, accounts).await
    }

    /// Accounts from an xlsx template with random usernames.
    pub async fn create_from_template(&self, eid: i64, workbook: Vec<u8>) -> Result<Vec<User>, DatabaseError> {
        let rows = read_template(workbook)?;
        if rows.is_empty() {
            return Err(DatabaseError::Invalid("template contains no user rows".to_string()));
        }
        check_batch_size(rows.len() as i128)?;
        let accounts = rows
            .into_iter()
            .map(|row| GeneratedUser {
                uname: format!("{}{}", random_letters(5), row.index),
                name: row.name,
                title: row.title,
                mobile: row.mobile,
            })
            .collect();
        self.insert_generated(eid, accounts).await
    }

    async fn insert_generated(&self, eid: i64, accounts: Vec<GeneratedUser>) -> Result<Vec<User>, DatabaseError> {
        // Every generated account shares the default password, so hash it once.
        let password = hash(DEFAULT_PASSWORD)?;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO ex_users (eid, name, uname, password, title, mobile) ");
        builder.push_values(accounts, |mut b, account| {
            b.push_bind(eid)
                .push_bind(account.name)
                .push_bind(account.uname)
                .push_bind(password.clone())
                .push_bind(account.title)
                .push_bind(account.mobile);
        });
        builder.push(" RETURNING *");

        let users = builder.build_query_as::<User>().fetch_all(&self.pool).await?;
        tracing::info!("Created {} users in exhibition {}", users.len(), eid);
        Ok(users)
    }

    pub async fn update(&self, id: i64, eid: i64, mut patch: UserPatch) -> Result<User, DatabaseError> {
        if let Some(password) = patch.password.take() {
            patch.password = Some(hash(&password)?);
        }
        self.repo.update_404(id, Some(eid), patch).await
    }

    pub async fn delete(&self, id: i64, eid: i64) -> Result<(), DatabaseError> {
        self.repo.delete_404(id, Some(eid)).await
    }

    /// Enable or disable the listed accounts; returns how many changed.
    pub async fn set_active(&self, eid: i64, ids: &[i64], active: bool) -> Result<u64, DatabaseError> {
        if ids.is_empty() {
            return Err(DatabaseError::Invalid("no input user ids".to_string()));
        }
        let result = sqlx::query(
            "UPDATE ex_users SET is_active = $1, updated_at = NOW() WHERE eid = $2 AND id = ANY($3)",
        )
        .bind(active)
        .bind(eid)
        .bind(ids)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

fn hash(password: &str) -> Result<String, DatabaseError> {
    hash_password(password).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        DatabaseError::Invalid("password could not be hashed".to_string())
    })
}

/// `prefix{start}` through `prefix{end}` inclusive.
pub fn batch_usernames(prefix: &str, [start, end]: [i64; 2]) -> Result<Vec<String>, DatabaseError> {
    if prefix.trim().is_empty() {
        return Err(DatabaseError::Invalid("name_prefix must not be empty".to_string()));
    }
    if start > end {
        return Err(DatabaseError::Invalid(format!("index_range [{}, {}] is empty", start, end)));
    }
    check_batch_size(i128::from(end) - i128::from(start) + 1)?;
    Ok((start..=end).map(|i| format!("{}{}", prefix, i)).collect())
}

fn check_batch_size(count: i128) -> Result<(), DatabaseError> {
    if count > MAX_BATCH_USERS as i128 {
        return Err(DatabaseError::Invalid(format!(
            "batch covers {} users, at most {} allowed",
            count, MAX_BATCH_USERS
        )));
    }
    Ok(())
}

fn random_letters(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(Uniform::new_inclusive(b'a', b'z'))
        .take(len)
        .map(char::from)
        .collect()
}

fn read_template(workbook: Vec<u8>) -> Result<Vec<TemplateRow>, DatabaseError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(workbook))
        .map_err(|e| DatabaseError::Invalid(format!("unreadable template: {}", e)))?;
    let range = workbook
        .worksheet_range(TEMPLATE_SHEET)
        .map_err(|e| DatabaseError::Invalid(format!("template sheet '{}': {}", TEMPLATE_SHEET, e)))?;

    let cells = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>());
    Ok(template_rows(cells))
}

/// Rows after the header block as name/title/mobile; blank rows are skipped.
pub fn template_rows<I>(rows: I) -> Vec<TemplateRow>
where
    I: IntoIterator<Item = Vec<String>>,
{
    rows.into_iter()
        .enumerate()
        .skip(TEMPLATE_HEADER_ROWS)
        .filter_map(|(index, cells)| {
            let cell = |i: usize| cells.get(i).map(|c| c.trim().to_string()).unwrap_or_default();
            let row = TemplateRow {
                index,
                name: cell(0),
                title: cell(1),
                mobile: cell(2),
            };
            if row.name.is_empty() && row.title.is_empty() && row.mobile.is_empty() {
                return None;
            }
            Some(row)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn batch_range_is_inclusive() {
        let names = batch_usernames("guest", [3, 5]).unwrap();
        assert_eq!(names, vec!["guest3", "guest4", "guest5"]);
    }

    #[test]
    fn batch_range_rejects_bad_input() {
        assert!(batch_usernames("guest", [5, 3]).is_err());
        assert!(batch_usernames("", [1, 2]).is_err());
        assert!(batch_usernames("guest", [1, 1001]).is_err());
        assert_eq!(batch_usernames("guest", [1, 1000]).unwrap().len(), 1000);
    }

    #[test]
    fn template_skips_headers_and_blank_rows() {
        let rows = template_rows(vec![
            row(&["Visitors"]),
            row(&["name", "title", "mobile"]),
            row(&["Ada", "Engineer", "555-0100"]),
            row(&["", "", ""]),
            row(&["Grace"]),
        ]);
        assert_eq!(
            rows,
            vec![
                TemplateRow {
                    index: 2,
                    name: "Ada".to_string(),
                    title: "Engineer".to_string(),
                    mobile: "555-0100".to_string(),
                },
                TemplateRow {
                    index: 4,
                    name: "Grace".to_string(),
                    title: String::new(),
                    mobile: String::new(),
                },
            ]
        );
    }

    #[test]
    fn oversized_template_is_refused() {
        let sheet = (0..MAX_BATCH_USERS + 3).map(|i| row(&[&format!("visitor{}", i)]));
        let rows = template_rows(sheet);
        assert_eq!(rows.len(), MAX_BATCH_USERS + 1);
        assert!(matches!(check_batch_size(rows.len() as i128), Err(DatabaseError::Invalid(_))));
        assert!(check_batch_size(MAX_BATCH_USERS as i128).is_ok());
    }

    #[test]
    fn random_letters_are_lowercase() {
        let letters = random_letters(5);
        assert_eq!(letters.len(), 5);
        assert!(letters.chars().all(|c| c.is_ascii_lowercase()));
    }
}
