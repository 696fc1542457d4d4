use crate::builder::PipelineBuilder;
use crate::node::{EventSender, Node, RunContext};
use crate::nodes::{FormatterNode, GathererNode, PlannerNode, RecommenderNode};
use crate::router::{LinearRouter, NextNode, Router};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use uniplan_llm::ChatClient;
use uniplan_tools::ToolRegistry;
use uniplan_types::{GraphConfig, PipelineEvent, PlannerInput, PlannerState, Stage};

const EVENT_BUFFER: usize = 256;

/// Failure inside a run, tagged with the stage that was executing
struct RunFailure {
    stage: Option<Stage>,
    error: anyhow::Error,
}

impl RunFailure {
    fn into_error(self) -> anyhow::Error {
        match self.stage {
            Some(stage) => self.error.context(format!("{} stage failed", stage)),
            None => self.error,
        }
    }

    fn message(&self) -> String {
        format!("{:#}", self.error)
    }
}

/// Plan -> Gather -> Recommend -> Format over one planner state
#[derive(Clone)]
pub struct Pipeline {
    client: Arc<dyn ChatClient>,
    tools: Arc<ToolRegistry>,
    config: GraphConfig,
    nodes: Arc<HashMap<Stage, Arc<dyn Node>>>,
    router: Arc<dyn Router>,
}

impl Pipeline {
    pub fn new(client: Arc<dyn ChatClient>, tools: Arc<ToolRegistry>, config: GraphConfig) -> Self {
        Self::with_router(client, tools, config, Arc::new(LinearRouter))
    }

    pub(crate) fn with_router(
        client: Arc<dyn ChatClient>,
        tools: Arc<ToolRegistry>,
        config: GraphConfig,
        router: Arc<dyn Router>,
    ) -> Self {
        let stage_nodes: [Arc<dyn Node>; 4] = [
            Arc::new(PlannerNode),
            Arc::new(GathererNode),
            Arc::new(RecommenderNode),
            Arc::new(FormatterNode),
        ];
        let nodes: HashMap<Stage, Arc<dyn Node>> = stage_nodes
            .into_iter()
            .map(|node| (node.stage(), node))
            .collect();

        Self {
            client,
            tools,
            config,
            nodes: Arc::new(nodes),
            router,
        }
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    /// Run every stage in order, calling `on_stage` after each one completes.
    /// The first failing stage aborts the run.
    pub async fn run<F>(&self, input: PlannerInput, mut on_stage: F) -> Result<PlannerState>
    where
        F: FnMut(Stage) + Send,
    {
        let state = PlannerState::from_input(input);
        self.execute_with_timeout(state, None, &mut on_stage)
            .await
            .map_err(RunFailure::into_error)
    }

    /// Spawn execution in background, return event receiver
    pub fn spawn_run(&self, input: PlannerInput) -> mpsc::Receiver<PipelineEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let pipeline = self.clone();

        tokio::spawn(async move {
            let start = Instant::now();
            let state = PlannerState::from_input(input);

            let started = PipelineEvent::RunStarted {
                run_id: state.run_id.clone(),
                query: state.query.clone(),
                timestamp: state.started_at.timestamp_millis(),
            };
            if tx.send(started).await.is_err() {
                return;
            }

            let event = match pipeline
                .execute_with_timeout(state, Some(tx.clone()), &mut |_: Stage| {})
                .await
            {
                Ok(state) => PipelineEvent::Completed {
                    state: Box::new(state),
                    total_duration_ms: start.elapsed().as_millis() as u64,
                },
                Err(failure) => PipelineEvent::Error {
                    message: failure.message(),
                    stage: failure.stage,
                },
            };
            let _ = tx.send(event).await;
        });

        rx
    }

    async fn execute_with_timeout(
        &self,
        state: PlannerState,
        events: Option<EventSender>,
        on_stage: &mut (dyn FnMut(Stage) + Send),
    ) -> Result<PlannerState, RunFailure> {
        let run = self.execute_loop(state, events, on_stage);
        match self.config.execution_timeout {
            Some(limit) => tokio::time::timeout(limit, run).await.unwrap_or_else(|_| {
                tracing::error!(timeout = ?limit, "Pipeline run timed out");
                Err(RunFailure {
                    stage: None,
                    error: anyhow!("Pipeline run timed out after {:?}", limit),
                })
            }),
            None => run.await,
        }
    }

    async fn execute_loop(
        &self,
        mut state: PlannerState,
        events: Option<EventSender>,
        on_stage: &mut (dyn FnMut(Stage) + Send),
    ) -> Result<PlannerState, RunFailure> {
        let mut ctx = RunContext::new(self.client.clone(), self.tools.clone(), state.llm_config.clone());
        if let Some(tx) = events {
            ctx = ctx.with_events(tx);
        }

        tracing::info!(run_id = %state.run_id, query = %state.query, "Starting planner run");
        let run_start = Instant::now();
        let mut current = Stage::Plan;
        let mut executed = 0;

        loop {
            // Guardrail: max stages
            if executed >= self.config.max_stages {
                return Err(RunFailure {
                    stage: Some(current),
                    error: anyhow!("Max stages ({}) reached", self.config.max_stages),
                });
            }

            let node = self.nodes.get(&current).ok_or_else(|| RunFailure {
                stage: Some(current),
                error: anyhow!("No node registered for stage {}", current),
            })?;
            let fail = |error: anyhow::Error| RunFailure {
                stage: Some(current),
                error,
            };

            ctx.emit(PipelineEvent::StageStarted { stage: current }).await.map_err(fail)?;
            tracing::info!(stage = %current, "Stage started");
            let stage_start = Instant::now();

            if let Err(error) = node.execute(&mut state, &ctx).await {
                tracing::error!(stage = %current, error = %format!("{:#}", error), "Stage failed");
                return Err(fail(error));
            }

            let duration_ms = stage_start.elapsed().as_millis() as u64;
            tracing::info!(stage = %current, duration_ms, "Stage completed");
            ctx.emit(PipelineEvent::StageCompleted {
                stage: current,
                duration_ms,
            })
            .await
            .map_err(fail)?;
            on_stage(current);
            executed += 1;

            match self.router.next(&state, current) {
                NextNode::Stage(next) => current = next,
                NextNode::End => break,
            }
        }

        tracing::info!(
            run_id = %state.run_id,
            total_duration_ms = run_start.elapsed().as_millis() as u64,
            "Planner run finished"
        );
        Ok(state)
    }
}
