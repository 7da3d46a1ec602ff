//! Conversation session — one user query, start to printed answer.
//!
//! 1. Send system + user messages with the action catalog (tool selection)
//! 2. If the model answers in prose, that is the answer
//! 3. Otherwise record its proposal, dispatch the calls, and append outcomes
//! 4. Resend the whole conversation without tools and take that reply as
//!    the summary

use log::{debug, warn};
use ops_types::{
    config::AssistantConfig,
    event::SessionEvent,
    message::Message,
    OpsError, Result,
};

use crate::catalog::ActionCatalog;
use crate::dispatch::{DispatchSummary, Dispatcher};
use crate::ports::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    AwaitingModel,
    Dispatching,
    AwaitingSummary,
    Complete,
    Failed(String),
}

/// What the caller prints, plus some bookkeeping for logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReply {
    pub text: String,
    pub actions: DispatchSummary,
}

pub struct Session<'a> {
    config: &'a AssistantConfig,
    llm: &'a dyn LlmPort,
    dispatcher: &'a Dispatcher<'a>,
    catalog: ActionCatalog,
    pub messages: Vec<Message>,
    pub state: SessionState,
}

impl<'a> Session<'a> {
    pub fn new(
        config: &'a AssistantConfig,
        llm: &'a dyn LlmPort,
        dispatcher: &'a Dispatcher<'a>,
        query: &str,
    ) -> Self {
        Self {
            config,
            llm,
            dispatcher,
            catalog: ActionCatalog::new(),
            messages: vec![Message::system(&config.system_prompt), Message::user(query)],
            state: SessionState::AwaitingModel,
        }
    }

    /// Drive the session to its answer. A model failure aborts the turn and
    /// is returned; action failures are folded into the conversation instead.
    pub async fn run(&mut self) -> Result<SessionReply> {
        if self.state != SessionState::AwaitingModel {
            return Err(OpsError::Other("session already ran".to_string()));
        }
        let events = self.dispatcher.event_bus().clone();
        events.emit(SessionEvent::TurnStart {
            query: self.messages[1].content.clone(),
        });

        let result = self.drive().await;
        match &result {
            Ok(reply) => {
                self.state = SessionState::Complete;
                events.emit(SessionEvent::Summary {
                    text: reply.text.clone(),
                });
            }
            Err(e) => {
                self.state = SessionState::Failed(e.to_string());
                events.emit(SessionEvent::Error {
                    message: e.to_string(),
                });
            }
        }
        events.emit(SessionEvent::TurnEnd);
        result
    }

    async fn drive(&mut self) -> Result<SessionReply> {
        let reply = self
            .complete(self.catalog.descriptors(), Some(ToolChoice::Auto))
            .await?;
        self.dispatcher.event_bus().emit(SessionEvent::ModelReply {
            proposed_calls: reply.tool_calls.len(),
        });

        if !reply.has_proposed_calls() {
            let text = reply.content.clone();
            self.messages.push(reply);
            return Ok(SessionReply {
                text,
                actions: DispatchSummary::default(),
            });
        }

        let calls = reply.tool_calls.clone();
        self.messages.push(reply);

        self.state = SessionState::Dispatching;
        debug!("dispatching {} proposed call(s)", calls.len());
        let actions = self.dispatcher.dispatch(&calls, &mut self.messages).await;

        self.state = SessionState::AwaitingSummary;
        let summary = self.complete(Vec::new(), None).await?;
        if summary.has_proposed_calls() {
            warn!(
                "ignoring {} call(s) proposed in the summary turn",
                summary.tool_calls.len()
            );
        }
        let text = summary.content;
        self.messages.push(Message::assistant(&text));

        Ok(SessionReply { text, actions })
    }

    async fn complete(
        &self,
        tools: Vec<ops_types::action::ActionDescriptor>,
        tool_choice: Option<ToolChoice>,
    ) -> Result<Message> {
        let req = ChatRequest {
            messages: self.messages.clone(),
            tools,
            tool_choice,
            model: self.config.llm.model.clone(),
            max_tokens: self.config.llm.max_tokens,
            temperature: self.config.llm.temperature,
        };
        debug!("requesting completion ({:?})", self.state);

        let limit = self.config.limits.model_timeout();
        let response = tokio::time::timeout(limit, self.llm.chat_completion(req))
            .await
            .map_err(|_| OpsError::Timeout(limit.as_millis() as u64))??;

        if let Some(usage) = &response.usage {
            debug!(
                "token usage: {} prompt + {} completion",
                usage.prompt_tokens, usage.completion_tokens
            );
        }
        Ok(response.message)
    }
}
