use uniplan_llm::PromptTemplate;

pub const SQL_RULES: &str = "Output ONLY the SQL query, no markdown formatting
Do NOT include ```sql or ``` tags
Do NOT include any explanations";

pub const SEARCH_SQL: PromptTemplate = PromptTemplate::new(
    "Generate a valid SQLite query for university data.

Choose the appropriate tables, columns, and query structure based on the requirements.
The query must be a single read-only SELECT statement.

Database schema:
{schema}

{rules}",
    "Generate SQL for: Location: {location}, Major: {major}, Institution: {institution}, Degree Level: {degree_level}",
);

pub const SEARCH_FORMAT: PromptTemplate = PromptTemplate::new(
    "Format university data into a readable format. Choose the best way to present the information.

Make it clear and easy to read.",
    "Format this university data: {data}",
);

pub const COMPARISON_SQL: PromptTemplate = PromptTemplate::new(
    "Generate a SQLite query to compare universities. Choose the appropriate tables, columns, and query structure for comparison.
The query must be a single read-only SELECT statement.

Database schema:
{schema}

{rules}",
    "Generate comparison SQL for: Location: {location}, Major: {major}, Institution: {institution}, Degree Level: {degree_level}",
);

pub const COMPARISON_FORMAT: PromptTemplate = PromptTemplate::new(
    "Format university comparison data into a readable comparison table. Choose the best way to present comparison information.

Make it clear and easy to read.",
    "Format this comparison data: {data}",
);

pub const COST_SQL: PromptTemplate = PromptTemplate::new(
    "Generate a SQLite query focused on university costs and affordability.

Choose the appropriate tables, columns, and query structure for cost analysis.
The query must be a single read-only SELECT statement.

Database schema:
{schema}

{rules}",
    "Generate cost analysis SQL for: Location: {location}, Major: {major}, Institution: {institution}, Degree Level: {degree_level}",
);

pub const COST_FORMAT: PromptTemplate = PromptTemplate::new(
    "Format university cost data into a readable cost analysis. Choose the best way to present cost information.

Make it clear and easy to read.",
    "Format this cost data: {data}",
);

pub const WEATHER_FORMAT: PromptTemplate = PromptTemplate::new(
    "Format weather search results into a readable weather report. Choose the best way to present weather information.

Make it clear and informative.",
    "Format this weather data for {location}: {data}",
);
