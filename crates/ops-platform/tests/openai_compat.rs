//! HTTP-level tests for the OpenAI-compatible adapter, against a local
//! wiremock server.

use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ops_core::catalog::ActionCatalog;
use ops_core::ports::{ChatRequest, LlmPort, ToolChoice};
use ops_platform::llm::{message_to_json, OpenAiCompatProvider};
use ops_types::config::{LlmConfig, LlmProvider};
use ops_types::message::{Message, ProposedCall, Role};
use ops_types::OpsError;

fn provider_for(server: &MockServer) -> OpenAiCompatProvider {
    OpenAiCompatProvider::new(LlmConfig {
        provider: LlmProvider::Custom,
        api_base: Some(format!("{}/v1", server.uri())),
        api_key: "sk-test".to_string(),
        ..LlmConfig::default()
    })
}

fn selection_request(query: &str) -> ChatRequest {
    ChatRequest {
        messages: vec![Message::system("You are an operator"), Message::user(query)],
        tools: ActionCatalog::new().descriptors(),
        tool_choice: Some(ToolChoice::Auto),
        model: "gpt-4o".to_string(),
        max_tokens: 256,
        temperature: 0.0,
    }
}

async fn mount_reply(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

async fn sent_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    serde_json::from_slice(&requests[0].body).unwrap()
}

#[tokio::test]
async fn parses_proposed_calls() {
    let server = MockServer::start().await;
    mount_reply(
        &server,
        200,
        json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {
                            "name": "restart_service",
                            "arguments": "{\"service_name\":\"gateway\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 120, "completion_tokens": 18, "total_tokens": 138}
        }),
    )
    .await;

    let response = provider_for(&server)
        .chat_completion(selection_request("restart the gateway service"))
        .await
        .unwrap();

    assert_eq!(response.message.role, Role::Assistant);
    assert_eq!(response.message.content, "");
    assert_eq!(
        response.message.tool_calls,
        vec![ProposedCall::new("call_abc", "restart_service", r#"{"service_name":"gateway"}"#)]
    );
    assert_eq!(response.usage.unwrap().total_tokens, 138);
}

#[tokio::test]
async fn parses_plain_text_reply() {
    let server = MockServer::start().await;
    mount_reply(
        &server,
        200,
        json!({
            "choices": [{"message": {"role": "assistant", "content": "All services look healthy."}}]
        }),
    )
    .await;

    let response = provider_for(&server)
        .chat_completion(selection_request("how is the cluster?"))
        .await
        .unwrap();

    assert_eq!(response.message.content, "All services look healthy.");
    assert!(!response.message.has_proposed_calls());
    assert!(response.usage.is_none());
}

#[tokio::test]
async fn versioned_base_url_is_not_doubled() {
    let server = MockServer::start().await;
    mount_reply(&server, 200, json!({"choices": [{"message": {"content": "ok"}}]})).await;

    let provider = OpenAiCompatProvider::new(LlmConfig {
        provider: LlmProvider::Custom,
        api_base: Some(format!("{}/v1/", server.uri())),
        api_key: "sk-test".to_string(),
        ..LlmConfig::default()
    });
    let response = provider
        .chat_completion(selection_request("status"))
        .await
        .unwrap();

    assert_eq!(response.message.content, "ok");
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.path(), "/v1/chat/completions");
}

#[tokio::test]
async fn null_arguments_become_empty_object() {
    let server = MockServer::start().await;
    mount_reply(
        &server,
        200,
        json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "restart_service", "arguments": null}
                    }]
                }
            }]
        }),
    )
    .await;

    let response = provider_for(&server)
        .chat_completion(selection_request("restart"))
        .await
        .unwrap();

    assert_eq!(
        response.message.tool_calls,
        vec![ProposedCall::new("call_1", "restart_service", "{}")]
    );
}

#[tokio::test]
async fn sends_tools_with_auto_choice() {
    let server = MockServer::start().await;
    mount_reply(&server, 200, json!({"choices": [{"message": {"content": "ok"}}]})).await;

    provider_for(&server)
        .chat_completion(selection_request("restart gateway"))
        .await
        .unwrap();

    let body = sent_body(&server).await;
    assert_eq!(body["model"], "gpt-4o");
    assert_eq!(body["tool_choice"], "auto");
    let tools = body["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 3);
    assert_eq!(tools[0]["type"], "function");
    assert_eq!(tools[0]["function"]["name"], "modify_config");
    assert_eq!(
        tools[0]["function"]["parameters"]["required"],
        json!(["service_name", "key", "value"])
    );
    assert_eq!(body["messages"][1]["role"], "user");
}

#[tokio::test]
async fn summary_turn_sends_no_tools() {
    let server = MockServer::start().await;
    mount_reply(&server, 200, json!({"choices": [{"message": {"content": "Restarted."}}]})).await;

    let call = ProposedCall::new("call_1", "restart_service", r#"{"service_name":"gateway"}"#);
    let req = ChatRequest {
        messages: vec![
            Message::system("sys"),
            Message::user("restart gateway"),
            Message::proposal("", vec![call]),
            Message::tool_result("call_1", "restart_service", r#"{"service_name":"gateway","action":"restart"}"#),
        ],
        tools: Vec::new(),
        tool_choice: None,
        model: "gpt-4o".to_string(),
        max_tokens: 256,
        temperature: 0.0,
    };
    provider_for(&server).chat_completion(req).await.unwrap();

    let body = sent_body(&server).await;
    assert!(body.get("tools").is_none());
    assert!(body.get("tool_choice").is_none());

    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages[2]["tool_calls"][0]["id"], "call_1");
    assert_eq!(messages[2]["tool_calls"][0]["function"]["name"], "restart_service");
    assert_eq!(messages[3]["role"], "tool");
    assert_eq!(messages[3]["tool_call_id"], "call_1");
    assert_eq!(messages[3]["name"], "restart_service");
}

#[tokio::test]
async fn http_error_is_llm_error() {
    let server = MockServer::start().await;
    mount_reply(&server, 401, json!({"error": {"message": "Incorrect API key provided"}})).await;

    let err = provider_for(&server)
        .chat_completion(selection_request("restart gateway"))
        .await
        .unwrap_err();

    match err {
        OpsError::Llm(msg) => {
            assert!(msg.starts_with("HTTP 401"), "got: {}", msg);
            assert!(msg.contains("Incorrect API key"));
        }
        other => panic!("expected LLM error, got {:?}", other),
    }
}

#[tokio::test]
async fn empty_choices_is_llm_error() {
    let server = MockServer::start().await;
    mount_reply(&server, 200, json!({"choices": []})).await;

    let err = provider_for(&server)
        .chat_completion(selection_request("restart gateway"))
        .await
        .unwrap_err();
    assert_eq!(err, OpsError::Llm("No choices in response".to_string()));
}

#[tokio::test]
async fn unreachable_endpoint_is_network_error() {
    let provider = OpenAiCompatProvider::new(LlmConfig {
        provider: LlmProvider::Custom,
        api_base: Some("http://127.0.0.1:1".to_string()),
        api_key: "sk-test".to_string(),
        ..LlmConfig::default()
    });

    let err = provider
        .chat_completion(selection_request("restart gateway"))
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::Network(_)), "got {:?}", err);
}

#[test]
fn base_url_defaults_to_provider() {
    let provider = OpenAiCompatProvider::new(LlmConfig::default());
    assert_eq!(provider.base_url(), "https://api.openai.com/v1");
}

#[test]
fn user_message_json_has_no_tool_fields() {
    let json = message_to_json(&Message::user("hello"));
    assert_eq!(json, json!({"role": "user", "content": "hello"}));
}
