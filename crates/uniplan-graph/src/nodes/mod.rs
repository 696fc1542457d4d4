mod planner;
mod gatherer;
mod recommender;
mod formatter;

pub use planner::PlannerNode;
pub use gatherer::GathererNode;
pub use recommender::RecommenderNode;
pub use formatter::FormatterNode;
