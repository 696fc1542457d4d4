pub mod tool;
pub mod registry;
pub mod database;
pub mod sql;
pub mod university;
pub mod weather;
mod prompts;

pub use tool::{PlannerTool, ToolError};
pub use registry::ToolRegistry;
pub use database::{execute_sql_and_format, DbError, UniversityDatabase, DEFAULT_DATABASE_PATH};
pub use sql::{SqlError, SqlQuery};
pub use university::{SqlTool, SqlToolArgs, SqlToolKind};
pub use weather::{TavilyClient, WeatherTool, TAVILY_SEARCH_URL};
