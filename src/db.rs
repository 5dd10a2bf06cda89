use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{Account, JobPosting, NewPosting, Role};

/// Schema migrations, applied in order and tracked via `PRAGMA user_version`.
/// Each entry runs exactly once per database file.
const MIGRATIONS: &[&str] = &[
    // v1: accounts and postings
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL CHECK (role IN ('Employer', 'Employee'))
    );

    CREATE TABLE IF NOT EXISTS job_postings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        company TEXT,
        role_title TEXT,
        experience_years_required INTEGER NOT NULL DEFAULT 0,
        mini_projects_required INTEGER NOT NULL DEFAULT 0,
        major_projects_required INTEGER NOT NULL DEFAULT 0,
        package TEXT,
        deadline TEXT NOT NULL
    );
    "#,
    // v2: attribute postings to the employer account that created them
    r#"
    ALTER TABLE job_postings ADD COLUMN posted_by TEXT NOT NULL DEFAULT '';
    CREATE INDEX IF NOT EXISTS idx_postings_posted_by ON job_postings(posted_by);
    "#,
];

/// Scope for [`Database::list_postings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingFilter<'a> {
    All,
    ByPoster(&'a str),
}

pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Open the store at its default location, creating parent directories
    /// as needed. Fails if the file cannot be opened; callers treat that as
    /// fatal at startup.
    pub fn open() -> Result<Self> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open_at(&path)
    }

    /// Open the store at an explicit path. Multiple sessions may open the
    /// same file; SQLite serializes their writes, and the busy timeout keeps
    /// a blocked writer waiting instead of failing immediately.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        debug!(path = %path.display(), "opened database");
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// In-memory store, private to this handle. Used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn default_path() -> PathBuf {
        // XDG data directory, or the current directory as a fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "portal") {
            proj_dirs.data_dir().join("portal.db")
        } else {
            PathBuf::from("portal.db")
        }
    }

    /// Bring the schema up to date. Idempotent; safe to call at every startup.
    pub fn init(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;
        for (i, migration) in MIGRATIONS.iter().enumerate().skip(version as usize) {
            self.conn.execute_batch(migration)?;
            self.conn.pragma_update(None, "user_version", (i + 1) as i64)?;
            info!(version = i + 1, "applied schema migration");
        }
        Ok(())
    }

    // --- Account operations ---

    /// Create an account. The password is digested before it is stored; a
    /// username collision leaves the table untouched and is reported as
    /// [`Error::DuplicateUsername`].
    pub fn register(&self, username: &str, password: &str, role: Role) -> Result<Account> {
        if username.is_empty() {
            return Err(Error::EmptyUsername);
        }
        let password_hash = hash_password(password);
        let inserted = self.conn.execute(
            "INSERT INTO accounts (username, password_hash, role) VALUES (?1, ?2, ?3)",
            params![username, password_hash, role.as_str()],
        );
        match inserted {
            Ok(_) => {
                info!(username, role = %role, "account registered");
                Ok(Account {
                    id: self.conn.last_insert_rowid(),
                    username: username.to_string(),
                    password_hash,
                    role,
                })
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                warn!(username, "registration rejected, username taken");
                Err(Error::DuplicateUsername(username.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Look up an account by credentials. Returns `None` for unknown
    /// usernames and wrong passwords alike, so callers cannot enumerate
    /// accounts.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<Account>> {
        let result = self.conn.query_row(
            "SELECT id, username, password_hash, role FROM accounts
             WHERE username = ?1 AND password_hash = ?2",
            params![username, hash_password(password)],
            row_to_account,
        );
        match result {
            Ok(account) => Ok(Some(account)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // --- Posting operations ---

    /// Append a posting and return its generated id. Thresholds are taken
    /// as-is; range policy belongs to the caller's input layer.
    pub fn create_posting(&self, posting: &NewPosting) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO job_postings
             (company, role_title, experience_years_required, mini_projects_required,
              major_projects_required, package, deadline, posted_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                posting.company,
                posting.role_title,
                posting.experience_years_required,
                posting.mini_projects_required,
                posting.major_projects_required,
                posting.package,
                posting.deadline.to_string(),
                posting.posted_by,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(id, role_title = %posting.role_title, posted_by = %posting.posted_by, "posting created");
        Ok(id)
    }

    /// Delete a posting on behalf of `requester`. Only the account that
    /// created a posting may remove it; a missing id is a no-op, not an
    /// error. Returns whether a row was removed.
    pub fn delete_posting(&self, id: i64, requester: &str) -> Result<bool> {
        let owner: Option<String> = match self.conn.query_row(
            "SELECT posted_by FROM job_postings WHERE id = ?1",
            [id],
            |row| row.get(0),
        ) {
            Ok(owner) => Some(owner),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };
        let Some(owner) = owner else {
            debug!(id, "delete of nonexistent posting ignored");
            return Ok(false);
        };
        if owner != requester {
            warn!(id, requester, "delete rejected, not the posting owner");
            return Err(Error::NotPostingOwner { id });
        }
        self.conn
            .execute("DELETE FROM job_postings WHERE id = ?1", [id])?;
        info!(id, requester, "posting deleted");
        Ok(true)
    }

    /// List postings, id-ascending so results are stable across calls.
    pub fn list_postings(&self, filter: PostingFilter<'_>) -> Result<Vec<JobPosting>> {
        let mut sql = String::from(
            "SELECT id, company, role_title, experience_years_required,
                    mini_projects_required, major_projects_required,
                    package, deadline, posted_by
             FROM job_postings",
        );
        if matches!(filter, PostingFilter::ByPoster(_)) {
            sql.push_str(" WHERE posted_by = ?1");
        }
        sql.push_str(" ORDER BY id");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = match filter {
            PostingFilter::All => stmt.query_map([], row_to_posting)?,
            PostingFilter::ByPoster(username) => stmt.query_map([username], row_to_posting)?,
        };
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Unique non-null role titles, sorted. Raw values; display casing is
    /// the caller's concern (see [`crate::matcher::title_case`]).
    pub fn distinct_roles(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT role_title FROM job_postings
             WHERE role_title IS NOT NULL ORDER BY role_title",
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

/// One-way digest of a password. Deterministic; used for equality
/// comparison at login, never reversed.
fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn row_to_account(row: &rusqlite::Row) -> rusqlite::Result<Account> {
    let role: String = row.get(3)?;
    let role = role.parse::<Role>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.into())
    })?;
    Ok(Account {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        role,
    })
}

fn row_to_posting(row: &rusqlite::Row) -> rusqlite::Result<JobPosting> {
    let deadline: String = row.get(7)?;
    let deadline = deadline.parse::<chrono::NaiveDate>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(JobPosting {
        id: row.get(0)?,
        company: row.get(1)?,
        role_title: row.get(2)?,
        experience_years_required: row.get(3)?,
        mini_projects_required: row.get(4)?,
        major_projects_required: row.get(5)?,
        package: row.get(6)?,
        deadline,
        posted_by: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.init().unwrap();
        db
    }

    fn sample_posting(posted_by: &str) -> NewPosting {
        NewPosting {
            company: "Acme".into(),
            role_title: "Backend Engineer".into(),
            experience_years_required: 1,
            mini_projects_required: 2,
            major_projects_required: 1,
            package: "12".into(),
            deadline: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
            posted_by: posted_by.into(),
        }
    }

    #[test]
    fn init_is_idempotent() {
        let db = test_db();
        db.init().unwrap();
        db.init().unwrap();
        assert!(db.list_postings(PostingFilter::All).unwrap().is_empty());
    }

    #[test]
    fn register_then_authenticate() {
        let db = test_db();
        let account = db.register("alice", "hunter2", Role::Employee).unwrap();
        assert_eq!(account.username, "alice");
        assert_eq!(account.role, Role::Employee);
        // SHA-256 hex digest
        assert_eq!(account.password_hash.len(), 64);
        assert_ne!(account.password_hash, "hunter2");

        let found = db.authenticate("alice", "hunter2").unwrap().unwrap();
        assert_eq!(found.id, account.id);
        assert_eq!(found.role, Role::Employee);
    }

    #[test]
    fn wrong_password_and_unknown_user_both_yield_none() {
        let db = test_db();
        db.register("alice", "hunter2", Role::Employee).unwrap();
        assert!(db.authenticate("alice", "hunter3").unwrap().is_none());
        assert!(db.authenticate("bob", "hunter2").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_leaves_store_unchanged() {
        let db = test_db();
        let first = db.register("alice", "hunter2", Role::Employee).unwrap();

        let err = db.register("alice", "other", Role::Employer).unwrap_err();
        assert!(matches!(err, Error::DuplicateUsername(ref name) if name == "alice"));

        // still exactly one row, original hash intact
        let account = db.authenticate("alice", "hunter2").unwrap().unwrap();
        assert_eq!(account.id, first.id);
        assert_eq!(account.password_hash, first.password_hash);
        assert!(db.authenticate("alice", "other").unwrap().is_none());
    }

    #[test]
    fn empty_username_is_rejected() {
        let db = test_db();
        assert!(matches!(
            db.register("", "pw", Role::Employee),
            Err(Error::EmptyUsername)
        ));
    }

    #[test]
    fn create_and_list_postings_in_id_order() {
        let db = test_db();
        let a = db.create_posting(&sample_posting("acme_hr")).unwrap();
        let mut second = sample_posting("acme_hr");
        second.role_title = "Data Analyst".into();
        let b = db.create_posting(&second).unwrap();
        assert!(b > a);

        let all = db.list_postings(PostingFilter::All).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, a);
        assert_eq!(all[1].id, b);
        assert_eq!(all[0].deadline, NaiveDate::from_ymd_opt(2099, 1, 1).unwrap());
    }

    #[test]
    fn list_by_poster_scopes_to_creator() {
        let db = test_db();
        db.create_posting(&sample_posting("acme_hr")).unwrap();
        db.create_posting(&sample_posting("globex_hr")).unwrap();
        db.create_posting(&sample_posting("acme_hr")).unwrap();

        let mine = db.list_postings(PostingFilter::ByPoster("acme_hr")).unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|p| p.posted_by == "acme_hr"));
    }

    #[test]
    fn delete_requires_ownership() {
        let db = test_db();
        let id = db.create_posting(&sample_posting("acme_hr")).unwrap();

        let err = db.delete_posting(id, "globex_hr").unwrap_err();
        assert!(matches!(err, Error::NotPostingOwner { id: got } if got == id));
        assert_eq!(db.list_postings(PostingFilter::All).unwrap().len(), 1);

        assert!(db.delete_posting(id, "acme_hr").unwrap());
        assert!(db.list_postings(PostingFilter::All).unwrap().is_empty());
    }

    #[test]
    fn delete_of_missing_id_is_a_noop() {
        let db = test_db();
        let id = db.create_posting(&sample_posting("acme_hr")).unwrap();
        assert!(!db.delete_posting(id + 100, "acme_hr").unwrap());
        assert_eq!(db.list_postings(PostingFilter::All).unwrap().len(), 1);
    }

    #[test]
    fn distinct_roles_dedupes_and_sorts() {
        let db = test_db();
        db.create_posting(&sample_posting("acme_hr")).unwrap();
        db.create_posting(&sample_posting("globex_hr")).unwrap();
        let mut other = sample_posting("acme_hr");
        other.role_title = "Data Analyst".into();
        db.create_posting(&other).unwrap();

        let roles = db.distinct_roles().unwrap();
        assert_eq!(roles, vec!["Backend Engineer", "Data Analyst"]);
    }
}
