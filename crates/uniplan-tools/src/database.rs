use crate::sql::{SqlError, SqlQuery};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde_json::{Map, Number, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_DATABASE_PATH: &str = "data/ipeds_data.db";

/// Rows past this are dropped before the result is handed to the model
const MAX_ROWS: usize = 200;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to open database at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    InvalidQuery(#[from] SqlError),
    #[error("statement is not read-only")]
    NotReadOnly,
    #[error("database connection lock poisoned")]
    Poisoned,
    #[error("no database is open")]
    NotOpen,
}

/// Read-only handle on the university (IPEDS) SQLite database.
///
/// A file-backed database is opened on first use and reopened after a failed
/// open, so a missing file surfaces as a query error instead of a startup failure.
pub struct UniversityDatabase {
    path: Option<PathBuf>,
    conn: Mutex<Option<Connection>>,
}

impl UniversityDatabase {
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            conn: Mutex::new(None),
        }
    }

    /// Wrap an existing connection (in-memory fixtures, pre-seeded databases)
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            path: None,
            conn: Mutex::new(Some(conn)),
        }
    }

    pub fn in_memory() -> Result<Self, DbError> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run a validated query and return each row as a column → value map
    pub fn query_rows(&self, query: &SqlQuery) -> Result<Vec<Map<String, Value>>, DbError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(query.as_str())?;
            if !stmt.readonly() {
                return Err(DbError::NotReadOnly);
            }

            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let mut rows = stmt.query([])?;
            let mut out = Vec::new();

            while let Some(row) = rows.next()? {
                if out.len() == MAX_ROWS {
                    warn!(limit = MAX_ROWS, "Query result truncated");
                    break;
                }
                let mut record = Map::with_capacity(columns.len());
                for (i, name) in columns.iter().enumerate() {
                    record.insert(name.clone(), to_json(row.get_ref(i)?));
                }
                out.push(record);
            }

            debug!(rows = out.len(), "Query executed");
            Ok(out)
        })
    }

    /// `CREATE TABLE` statements of every user table, for SQL-writing prompts
    pub fn schema(&self) -> Result<String, DbError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT sql FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND sql IS NOT NULL \
                 ORDER BY name",
            )?;
            let statements = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(statements.join(";\n"))
        })
    }

    /// Cheap reachability check for health endpoints
    pub fn ping(&self) -> Result<(), DbError> {
        self.with_connection(|conn| {
            conn.query_row("SELECT 1", [], |_| Ok(()))?;
            Ok(())
        })
    }

    fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, DbError>,
    ) -> Result<T, DbError> {
        let mut guard = self.conn.lock().map_err(|_| DbError::Poisoned)?;

        if guard.is_none() {
            if let Some(path) = &self.path {
                let conn = Connection::open_with_flags(
                    path,
                    OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
                )
                .map_err(|source| DbError::Open {
                    path: path.display().to_string(),
                    source,
                })?;
                debug!(path = %path.display(), "University database opened");
                *guard = Some(conn);
            }
        }

        match guard.as_ref() {
            Some(conn) => f(conn),
            None => Err(DbError::NotOpen),
        }
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(format!("<blob {} bytes>", bytes.len())),
    }
}

/// Validate and run model-written SQL, returning the rows as a JSON array.
///
/// Never fails: validation and database errors come back as
/// `"Database error: ..."` so the formatting step can still report them.
pub fn execute_sql_and_format(db: &UniversityDatabase, text: &str) -> String {
    let result = SqlQuery::parse(text)
        .map_err(DbError::from)
        .and_then(|query| db.query_rows(&query));

    match result {
        Ok(rows) => Value::Array(rows.into_iter().map(Value::Object).collect()).to_string(),
        Err(e) => {
            warn!(error = %e, "SQL tool query failed");
            format!("Database error: {}", e)
        }
    }
}
