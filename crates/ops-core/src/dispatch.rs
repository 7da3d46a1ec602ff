//! Dispatch loop — turns proposed calls into tool messages.
//!
//! Every proposed call yields exactly one tool message, appended in the order
//! the model proposed the calls. A failing call never stops the others.

use futures::stream::{self, StreamExt};
use log::{debug, warn};
use ops_types::{
    action::ActionOutcome,
    event::SessionEvent,
    message::{Message, ProposedCall},
};
use thiserror::Error;

use crate::catalog::Action;
use crate::event_bus::EventBus;
use crate::executor::ActionExecutor;

/// Per-call failures. All of them end up as `ActionOutcome::Failure` and are
/// reported to the model, never to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("{0}")]
    Decode(String),

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("{0}")]
    Execution(String),
}

impl From<DispatchError> for ActionOutcome {
    fn from(e: DispatchError) -> Self {
        ActionOutcome::Failure(e.to_string())
    }
}

/// Counts for one dispatch turn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl DispatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

pub struct Dispatcher<'a> {
    executor: ActionExecutor<'a>,
    event_bus: EventBus,
    max_concurrent: usize,
}

impl<'a> Dispatcher<'a> {
    pub fn new(executor: ActionExecutor<'a>, event_bus: EventBus) -> Self {
        Self {
            executor,
            event_bus,
            max_concurrent: 1,
        }
    }

    /// Allow up to `n` calls of one turn in flight at once. Tool messages
    /// still follow proposal order.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Execute `calls` and append one tool message per call to `conversation`.
    pub async fn dispatch(
        &self,
        calls: &[ProposedCall],
        conversation: &mut Vec<Message>,
    ) -> DispatchSummary {
        // `buffered` yields in input order regardless of completion order
        let outcomes: Vec<ActionOutcome> = stream::iter(calls.iter().map(|call| self.run_call(call)))
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let mut summary = DispatchSummary::default();
        for (call, outcome) in calls.iter().zip(outcomes) {
            if outcome.is_success() {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
            conversation.push(Message::tool_result(
                &call.id,
                call.action_name(),
                outcome.content(),
            ));
        }
        debug!(
            "dispatched {} call(s): {} ok, {} failed",
            summary.total(),
            summary.succeeded,
            summary.failed
        );
        summary
    }

    async fn run_call(&self, call: &ProposedCall) -> ActionOutcome {
        self.event_bus.emit(SessionEvent::ActionStart {
            call_id: call.id.clone(),
            action: call.action_name().to_string(),
            arguments: call.function.arguments.clone(),
        });

        let outcome = match Action::decode(call) {
            Ok(action) => self.executor.invoke(&action).await,
            Err(e) => {
                warn!("rejected call {} ({}): {}", call.id, call.action_name(), e);
                e.into()
            }
        };

        self.event_bus.emit(SessionEvent::ActionEnd {
            call_id: call.id.clone(),
            action: call.action_name().to_string(),
            success: outcome.is_success(),
            content: outcome.content(),
        });
        outcome
    }
}
