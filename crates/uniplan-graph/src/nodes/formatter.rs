use crate::error::StageError;
use crate::node::{Node, RunContext};
use crate::prompts;
use anyhow::Result;
use async_trait::async_trait;
use uniplan_kg::KnowledgeGraph;
use uniplan_types::{PlannerState, Stage};

/// Turns the report into knowledge-graph JSON and parses it.
///
/// Unparseable output leaves `knowledge_graph` empty but keeps the raw text,
/// so the report still reaches the caller.
pub struct FormatterNode;

#[async_trait]
impl Node for FormatterNode {
    async fn execute(&self, state: &mut PlannerState, ctx: &RunContext) -> Result<()> {
        let report = state.report.as_deref().ok_or(StageError::MissingInput {
            stage: Stage::Format,
            field: "report",
        })?;

        let messages = prompts::FORMATTER.render(&[("report", report)])?;
        let response = ctx.chat(messages, None).await?;
        let raw = response.content_or_empty().to_string();

        let parsed = KnowledgeGraph::parse(&raw);
        state.raw_knowledge_graph = Some(raw);

        match parsed {
            Ok(graph) => {
                tracing::info!(
                    nodes = graph.nodes.len(),
                    edges = graph.edges.len(),
                    "Knowledge graph generated"
                );
                state.knowledge_graph = Some(graph);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Formatter output is not a valid knowledge graph");
                state.knowledge_graph = None;
            }
        }
        Ok(())
    }

    fn stage(&self) -> Stage {
        Stage::Format
    }
}
