//! Composition root — wires the adapters into a dispatcher and runs queries.

use std::path::Path;

use anyhow::Context;
use log::{debug, error, info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use ops_core::ports::{ClusterPort, CommandPort, LlmPort};
use ops_core::{ActionExecutor, Dispatcher, EventBus, ExecutorSettings, Session};
use ops_types::{config::AssistantConfig, event::SessionEvent};

use crate::args::Args;

pub const PROMPT: &str = "Enter an operations instruction (type 'exit' to quit):\n> ";

/// File values first, then flags, then validation.
pub fn load_config(args: &Args) -> anyhow::Result<AssistantConfig> {
    let mut config = match &args.config {
        Some(path) => read_config_file(path)?,
        None => AssistantConfig::default(),
    };
    args.apply(&mut config)?;
    config.validate()?;
    Ok(config)
}

fn read_config_file(path: &Path) -> anyhow::Result<AssistantConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = AssistantConfig::from_json(&text)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(config)
}

/// The literal `exit`, in any case, ends the loop
pub fn is_exit(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("exit")
}

pub struct App<'a> {
    config: &'a AssistantConfig,
    llm: &'a dyn LlmPort,
    dispatcher: Dispatcher<'a>,
    event_bus: EventBus,
}

impl<'a> App<'a> {
    pub fn new(
        config: &'a AssistantConfig,
        llm: &'a dyn LlmPort,
        cluster: &'a dyn ClusterPort,
        commands: &'a dyn CommandPort,
    ) -> Self {
        let event_bus = EventBus::new();
        let executor = ActionExecutor::new(cluster, commands, ExecutorSettings::from_config(config));
        let dispatcher = Dispatcher::new(executor, event_bus.clone())
            .with_max_concurrent(config.limits.max_concurrent_actions);
        Self {
            config,
            llm,
            dispatcher,
            event_bus,
        }
    }

    /// One query, one session. Model failures come back as printable text.
    pub async fn answer(&self, query: &str) -> String {
        let mut session = Session::new(self.config, self.llm, &self.dispatcher, query);
        let text = match session.run().await {
            Ok(reply) => {
                debug!(
                    "session complete: {} action(s) ok, {} failed",
                    reply.actions.succeeded, reply.actions.failed
                );
                reply.text
            }
            Err(e) => format!("error: {}", e),
        };
        self.log_events();
        text
    }

    /// Prompt, read a line, answer, repeat until `exit` or end of input.
    pub async fn run_interactive<R, W>(&self, input: R, output: &mut W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        loop {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            if is_exit(&line) {
                break;
            }
            let query = line.trim();
            if query.is_empty() {
                continue;
            }

            let answer = self.answer(query).await;
            output.write_all(format!("{}\n\n", answer).as_bytes()).await?;
        }
        output.write_all(b"Goodbye\n").await?;
        output.flush().await
    }

    fn log_events(&self) {
        for event in self.event_bus.drain() {
            match event {
                SessionEvent::ActionStart { call_id, action, arguments } => {
                    info!("[{}] {} {}", call_id, action, arguments);
                }
                SessionEvent::ActionEnd { call_id, action, success: true, .. } => {
                    info!("[{}] {} done", call_id, action);
                }
                SessionEvent::ActionEnd { call_id, action, content, .. } => {
                    warn!("[{}] {} failed: {}", call_id, action, content);
                }
                SessionEvent::Error { message } => error!("model request failed: {}", message),
                other => debug!("{:?}", other),
            }
        }
    }
}
