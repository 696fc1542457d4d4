use uniplan_types::{PlannerState, Stage};

/// Decides which stage runs after `current`
pub trait Router: Send + Sync {
    fn next(&self, state: &PlannerState, current: Stage) -> NextNode;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextNode {
    Stage(Stage),
    End,
}

/// Plan -> Gather -> Recommend -> Format -> END
pub struct LinearRouter;

impl Router for LinearRouter {
    fn next(&self, _state: &PlannerState, current: Stage) -> NextNode {
        match current {
            Stage::Plan => NextNode::Stage(Stage::Gather),
            Stage::Gather => NextNode::Stage(Stage::Recommend),
            Stage::Recommend => NextNode::Stage(Stage::Format),
            Stage::Format => NextNode::End,
        }
    }
}
