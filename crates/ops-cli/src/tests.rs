#[cfg(test)]
mod tests {
    use crate::app::*;
    use crate::args::Args;
    use async_trait::async_trait;
    use clap::Parser;
    use ops_core::ports::*;
    use ops_types::action::ExecResult;
    use ops_types::config::{AssistantConfig, LlmProvider};
    use ops_types::message::{Message, ProposedCall};
    use ops_types::OpsError;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use tokio::io::BufReader;

    // ─── Fakes ───────────────────────────────────────────────

    struct ScriptedLlm {
        replies: RefCell<VecDeque<ops_types::Result<Message>>>,
        calls: RefCell<usize>,
    }

    impl ScriptedLlm {
        fn new(replies: Vec<ops_types::Result<Message>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                calls: RefCell::new(0),
            }
        }
    }

    #[async_trait(?Send)]
    impl LlmPort for ScriptedLlm {
        async fn chat_completion(&self, _req: ChatRequest) -> ops_types::Result<ChatResponse> {
            *self.calls.borrow_mut() += 1;
            let next = self
                .replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(OpsError::Llm("script exhausted".to_string())));
            next.map(|message| ChatResponse { message, usage: None })
        }
    }

    /// Every deployment exists with no annotations; config objects do not.
    struct StubCluster;

    #[async_trait(?Send)]
    impl ClusterPort for StubCluster {
        async fn get_config_data(&self, name: &str, _ns: &str) -> ops_types::Result<Option<StringMap>> {
            Err(OpsError::Cluster(format!("configmaps \"{}\" not found", name)))
        }

        async fn patch_config_data(&self, _name: &str, _ns: &str, _data: &StringMap) -> ops_types::Result<()> {
            Ok(())
        }

        async fn get_template_annotations(&self, _name: &str, _ns: &str) -> ops_types::Result<Option<StringMap>> {
            Ok(None)
        }

        async fn patch_template_annotations(
            &self,
            _name: &str,
            _ns: &str,
            _annotations: &StringMap,
        ) -> ops_types::Result<()> {
            Ok(())
        }
    }

    struct StubCommands;

    #[async_trait(?Send)]
    impl CommandPort for StubCommands {
        async fn run(&self, _program: &str, _args: &[String]) -> ops_types::Result<ExecResult> {
            Ok(ExecResult {
                stdout: String::new(),
                stderr: String::new(),
                exit_code: 0,
            })
        }
    }

    fn config() -> AssistantConfig {
        let mut config = AssistantConfig::default();
        config.llm.api_key = "sk-test".to_string();
        config
    }

    async fn run_script(llm: &ScriptedLlm, input: &str) -> String {
        let config = config();
        let app = App::new(&config, llm, &StubCluster, &StubCommands);
        let mut output: Vec<u8> = Vec::new();
        app.run_interactive(BufReader::new(input.as_bytes()), &mut output)
            .await
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    // ─── Exit detection ──────────────────────────────────────

    #[test]
    fn test_is_exit() {
        assert!(is_exit("exit"));
        assert!(is_exit("EXIT"));
        assert!(is_exit("  Exit \n"));
        assert!(!is_exit("exit now"));
        assert!(!is_exit("quit"));
        assert!(!is_exit(""));
    }

    // ─── Args ────────────────────────────────────────────────

    #[test]
    fn test_args_override_config() {
        let args = Args::try_parse_from([
            "kube-ops",
            "--provider",
            "deepseek",
            "--model",
            "deepseek-chat",
            "--api-key",
            "sk-flag",
            "--context",
            "alpha",
            "-n",
            "ops",
            "--action-timeout-secs",
            "5",
            "--max-concurrent-actions",
            "3",
            "-vv",
        ])
        .unwrap();

        let mut config = AssistantConfig::default();
        args.apply(&mut config).unwrap();

        assert_eq!(config.llm.provider, LlmProvider::DeepSeek);
        assert_eq!(config.llm.model, "deepseek-chat");
        assert_eq!(config.llm.api_key, "sk-flag");
        assert_eq!(config.cluster.context.as_deref(), Some("alpha"));
        assert_eq!(config.cluster.namespace, "ops");
        assert_eq!(config.limits.action_timeout_ms, 5_000);
        assert_eq!(config.limits.max_concurrent_actions, 3);
        assert_eq!(args.log_filter(), "debug");
    }

    #[test]
    fn test_args_unknown_provider() {
        let args = Args {
            provider: Some("acme".to_string()),
            ..Args::default()
        };
        let err = args.apply(&mut AssistantConfig::default()).unwrap_err();
        assert_eq!(err, OpsError::Config("unknown provider: acme".to_string()));
    }

    #[test]
    fn test_load_config_from_file_with_flag_override() {
        let path = std::env::temp_dir().join(format!("kube-ops-test-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"llm": {"api_key": "sk-file", "model": "gpt-4o-mini"}, "cluster": {"namespace": "staging"}}"#,
        )
        .unwrap();

        let args = Args {
            config: Some(path.clone()),
            namespace: Some("prod".to_string()),
            ..Args::default()
        };
        let config = load_config(&args).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.llm.api_key, "sk-file");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.cluster.namespace, "prod");
    }

    #[test]
    fn test_load_config_requires_api_key() {
        assert!(load_config(&Args::default()).is_err());
    }

    // ─── Query loop ──────────────────────────────────────────

    #[tokio::test]
    async fn test_loop_answers_until_exit() {
        let llm = ScriptedLlm::new(vec![
            Ok(Message::assistant("Cluster looks fine.")),
            Ok(Message::assistant("never reached")),
        ]);

        let output = run_script(&llm, "how is it going?\n\n   \nExit\nrestart gateway\n").await;

        assert!(output.contains("Cluster looks fine."));
        assert!(!output.contains("never reached"));
        assert!(output.ends_with("Goodbye\n"));
        assert_eq!(*llm.calls.borrow(), 1);
    }

    #[tokio::test]
    async fn test_loop_stops_at_end_of_input() {
        let llm = ScriptedLlm::new(vec![Ok(Message::assistant("ok"))]);
        let output = run_script(&llm, "status").await;
        assert!(output.contains("ok\n\n"));
        assert_eq!(*llm.calls.borrow(), 1);
    }

    #[tokio::test]
    async fn test_model_error_is_printed_and_loop_continues() {
        let llm = ScriptedLlm::new(vec![
            Err(OpsError::Network("connection refused".to_string())),
            Ok(Message::assistant("second answer")),
        ]);

        let output = run_script(&llm, "first\nsecond\nexit\n").await;

        assert!(output.contains("error: Network error: connection refused"));
        assert!(output.contains("second answer"));
        assert_eq!(*llm.calls.borrow(), 2);
    }

    #[tokio::test]
    async fn test_answer_with_failed_action_reaches_summary() {
        let llm = ScriptedLlm::new(vec![
            Ok(Message::proposal(
                "",
                vec![ProposedCall::new(
                    "call_1",
                    "modify_config",
                    r#"{"service_name":"ghost-config","key":"x","value":"y"}"#,
                )],
            )),
            Ok(Message::assistant("ghost-config does not exist.")),
        ]);
        let config = config();
        let app = App::new(&config, &llm, &StubCluster, &StubCommands);

        assert_eq!(app.answer("set x=y on ghost").await, "ghost-config does not exist.");
        assert_eq!(*llm.calls.borrow(), 2);
    }
}
