//! Integration tests for the Dify app clients using wiremock.

use std::time::Duration;

use dify_client::{ChatClient, Client, ClientConfig, CompletionClient, WorkflowClient};
use dify_types::{
    ChatRequest, CompletionRequest, DEFAULT_USER, DifyError, FeedbackRequest, RenameRequest,
    WorkflowRequest, codes,
};
use futures::StreamExt;
use wiremock::matchers::{
    body_partial_json, body_string_contains, header, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "app-test-key";

fn config(server: &MockServer) -> ClientConfig {
    // Trailing slash must be stripped before paths are appended.
    ClientConfig::new(API_KEY, format!("{}/", server.uri()))
}

fn chat(server: &MockServer) -> ChatClient {
    ChatClient::new(config(server)).expect("valid config")
}

// ─── Chat ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn send_message_posts_blocking_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat-messages"))
        .and(header("authorization", "Bearer app-test-key"))
        .and(body_partial_json(serde_json::json!({
            "query": "Hi",
            "response_mode": "blocking",
            "user": "alice",
            "inputs": {"lang": "en"},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "event": "message",
            "message_id": "m-1",
            "conversation_id": "c-1",
            "mode": "chat",
            "answer": "Hello!",
            "metadata": {"usage": {"total_tokens": 12}},
            "created_at": 1_705_395_332,
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let resp = chat(&mock_server)
        .send_message(ChatRequest::new("Hi").user("alice").input("lang", "en"))
        .await
        .expect("should succeed");

    assert_eq!(resp.answer, "Hello!");
    assert_eq!(resp.conversation_id, "c-1");
    assert_eq!(resp.metadata.usage.total_tokens, 12);
}

#[tokio::test]
async fn empty_user_is_replaced_with_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat-messages"))
        .and(body_partial_json(serde_json::json!({"user": DEFAULT_USER})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"answer": "ok"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let resp = chat(&mock_server)
        .send_message(ChatRequest::new("Hi"))
        .await
        .expect("should succeed");
    assert_eq!(resp.answer, "ok");
}

#[tokio::test]
async fn configured_default_user_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/meta"))
        .and(query_param("user", "svc-bot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "tool_icons": {"dalle3": "https://example.com/icon.png"},
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let chat = ChatClient::new(config(&mock_server).default_user("svc-bot")).expect("valid");
    let meta = chat.meta("").await.expect("should succeed");
    assert!(meta.tool_icons.contains_key("dalle3"));
}

#[tokio::test]
async fn stop_message_posts_user() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat-messages/task-9/stop"))
        .and(body_partial_json(serde_json::json!({"user": "alice"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": "success"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let resp = chat(&mock_server)
        .stop_message("task-9", "alice")
        .await
        .expect("should succeed");
    assert_eq!(resp.result, "success");
}

#[tokio::test]
async fn message_feedback_posts_rating() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages/m-1/feedbacks"))
        .and(body_partial_json(serde_json::json!({"rating": "like", "user": "alice"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": "success"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let feedback = FeedbackRequest {
        rating: "like".into(),
        user: "alice".into(),
    };
    let resp = chat(&mock_server)
        .message_feedback("m-1", feedback)
        .await
        .expect("should succeed");
    assert_eq!(resp.result, "success");
}

#[tokio::test]
async fn suggested_questions_sends_user_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/messages/m-1/suggested"))
        .and(query_param("user", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "success",
            "data": ["Why?", "How?"],
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let resp = chat(&mock_server)
        .suggested_questions("m-1", "alice")
        .await
        .expect("should succeed");
    assert_eq!(resp.data, vec!["Why?", "How?"]);
}

#[tokio::test]
async fn messages_uses_default_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/messages"))
        .and(query_param("conversation_id", "c-1"))
        .and(query_param("user", "alice"))
        .and(query_param("limit", "20"))
        .and(query_param("first_id", "m-5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "limit": 20,
            "has_more": false,
            "data": [{
                "id": "m-4",
                "conversation_id": "c-1",
                "query": "Hi",
                "answer": "Hello",
                "feedback": {"rating": "like"},
                "message_files": [{"id": "f", "type": "image", "url": "u", "belongs_to": "user"}],
            }],
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let resp = chat(&mock_server)
        .messages("c-1", "alice", Some("m-5"), None)
        .await
        .expect("should succeed");
    assert_eq!(resp.data.len(), 1);
    assert_eq!(resp.data[0].answer, "Hello");
    assert_eq!(resp.data[0].feedback.as_ref().map(|f| f.rating.as_str()), Some("like"));
    assert_eq!(resp.data[0].message_files[0].file_type, "image");
}

#[tokio::test]
async fn conversations_sends_paging_and_pinned() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/conversations"))
        .and(query_param("user", "alice"))
        .and(query_param("limit", "5"))
        .and(query_param("last_id", "c-9"))
        .and(query_param("pinned", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "limit": 5,
            "has_more": true,
            "data": [{"id": "c-8", "name": "Trip", "status": "normal"}],
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let resp = chat(&mock_server)
        .conversations("alice", Some("c-9"), Some(5), Some(true))
        .await
        .expect("should succeed");
    assert!(resp.has_more);
    assert_eq!(resp.data[0].name, "Trip");
}

#[tokio::test]
async fn delete_conversation_accepts_empty_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/conversations/c-1"))
        .and(body_partial_json(serde_json::json!({"user": "alice"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    chat(&mock_server)
        .delete_conversation("c-1", "alice")
        .await
        .expect("should succeed");
}

#[tokio::test]
async fn rename_conversation_posts_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/conversations/c-1/name"))
        .and(body_partial_json(serde_json::json!({"name": "Plans", "user": DEFAULT_USER})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "c-1",
            "name": "Plans",
            "status": "normal",
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let rename = RenameRequest {
        name: Some("Plans".into()),
        ..Default::default()
    };
    let resp = chat(&mock_server)
        .rename_conversation("c-1", rename)
        .await
        .expect("should succeed");
    assert_eq!(resp.name, "Plans");
}

#[tokio::test]
async fn parameters_decodes_form() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/parameters"))
        .and(query_param("user", DEFAULT_USER))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "opening_statement": "Welcome",
            "speech_to_text": {"enabled": true},
            "user_input_form": [
                {"text-input": {"label": "Name", "variable": "name", "required": true}}
            ],
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let params = chat(&mock_server).parameters("").await.expect("should succeed");
    assert_eq!(params.opening_statement, "Welcome");
    assert!(params.speech_to_text.enabled);
    assert_eq!(params.user_input_form[0]["text-input"].variable, "name");
}

// ─── Completion and workflow ─────────────────────────────────────────────────

#[tokio::test]
async fn completion_send_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/completion-messages"))
        .and(body_partial_json(serde_json::json!({
            "inputs": {"query": "Summarize"},
            "response_mode": "blocking",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message_id": "m-1",
            "mode": "completion",
            "answer": "Short.",
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let completion = CompletionClient::new(config(&mock_server)).expect("valid");
    let resp = completion
        .send_message(CompletionRequest::new().input("query", "Summarize"))
        .await
        .expect("should succeed");
    assert_eq!(resp.answer, "Short.");
}

#[tokio::test]
async fn completion_stop_uses_completion_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/completion-messages/t-1/stop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": "success"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let completion = CompletionClient::new(config(&mock_server)).expect("valid");
    let resp = completion.stop_message("t-1", "").await.expect("should succeed");
    assert_eq!(resp.result, "success");
}

#[tokio::test]
async fn workflow_run_blocking() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/workflows/run"))
        .and(body_partial_json(serde_json::json!({
            "inputs": {"city": "Paris"},
            "response_mode": "blocking",
            "user": "alice",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "workflow_run_id": "r-1",
            "task_id": "t-1",
            "data": {
                "id": "r-1",
                "status": "succeeded",
                "outputs": {"weather": "sunny"},
                "total_steps": 3,
            },
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let workflow = WorkflowClient::new(config(&mock_server)).expect("valid");
    let resp = workflow
        .run(WorkflowRequest::new().input("city", "Paris").user("alice"))
        .await
        .expect("should succeed");
    assert_eq!(resp.data.status, "succeeded");
    assert_eq!(resp.data.outputs["weather"], "sunny");
    assert_eq!(resp.data.total_steps, 3);
}

#[tokio::test]
async fn workflow_stop_and_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/workflows/tasks/t-1/stop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": "success"})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/workflows/run/r-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "r-1",
            "status": "stopped",
            "error": "stopped by user",
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let workflow = WorkflowClient::new(config(&mock_server)).expect("valid");
    workflow.stop("t-1", "alice").await.expect("stop");
    let status = workflow.run_status("r-1").await.expect("status");
    assert_eq!(status.status, "stopped");
    assert_eq!(status.error.as_deref(), Some("stopped by user"));
}

// ─── Files and audio ─────────────────────────────────────────────────────────

#[tokio::test]
async fn upload_file_sends_multipart() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/files/upload"))
        .and(body_string_contains("filename=\"report.txt\""))
        .and(body_string_contains("quarterly numbers"))
        .and(body_string_contains("name=\"user\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "file-1",
            "name": "report.txt",
            "size": 17,
            "extension": "txt",
            "mime_type": "text/plain",
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("report.txt");
    std::fs::write(&file, "quarterly numbers").expect("write");

    let client = Client::new(config(&mock_server)).expect("valid");
    let resp = client.upload_file(&file, "alice").await.expect("should succeed");
    assert_eq!(resp.id, "file-1");
    assert_eq!(resp.size, 17);
}

#[tokio::test]
async fn upload_file_bytes_sends_given_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/files/upload"))
        .and(body_string_contains("filename=\"inline.bin\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "file-2"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::new(config(&mock_server)).expect("valid");
    let resp = client
        .upload_file_bytes(b"\x00\x01\x02".to_vec(), "inline.bin", "")
        .await
        .expect("should succeed");
    assert_eq!(resp.id, "file-2");
}

#[tokio::test]
async fn upload_missing_file_is_io_error() {
    let mock_server = MockServer::start().await;
    let client = Client::new(config(&mock_server)).expect("valid");

    let err = client
        .upload_file("/definitely/not/here.txt", "alice")
        .await
        .expect_err("should fail");
    assert!(matches!(err, DifyError::Io(_)));
}

#[tokio::test]
async fn text_to_audio_returns_raw_bytes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/text-to-audio"))
        .and(body_partial_json(serde_json::json!({"text": "Hello", "streaming": false})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"ID3\x03audio".to_vec(), "audio/mpeg"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::new(config(&mock_server)).expect("valid");
    let mut audio = client
        .text_to_audio("Hello", "alice", false)
        .await
        .expect("should succeed");

    let mut bytes = Vec::new();
    while let Some(chunk) = audio.next().await {
        bytes.extend_from_slice(&chunk.expect("chunk"));
    }
    assert_eq!(bytes, b"ID3\x03audio");
}

#[tokio::test]
async fn audio_to_text_returns_transcript() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio-to-text"))
        .and(body_string_contains("filename=\"memo.mp3\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": "hi there"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("memo.mp3");
    std::fs::write(&file, b"ID3").expect("write");

    let client = Client::new(config(&mock_server)).expect("valid");
    let resp = client.audio_to_text(&file, "alice").await.expect("should succeed");
    assert_eq!(resp.text, "hi there");
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn error_object_is_decoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat-messages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "code": "invalid_api_key",
            "message": "Access token is invalid",
            "status": 401,
        })))
        .mount(&mock_server)
        .await;

    let err = chat(&mock_server)
        .send_message(ChatRequest::new("Hi"))
        .await
        .expect_err("should fail");

    match &err {
        DifyError::Api(api) => {
            assert_eq!(api.status_code, 401);
            assert!(api.is(codes::INVALID_API_KEY));
            assert_eq!(api.message, "Access token is invalid");
        }
        other => panic!("expected Api, got: {other:?}"),
    }
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn non_json_error_body_is_kept_raw() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/parameters"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&mock_server)
        .await;

    let err = chat(&mock_server).parameters("").await.expect_err("should fail");
    assert!(
        matches!(&err, DifyError::Http { status: 502, body } if body.contains("bad gateway"))
    );
    assert!(err.is_retryable());
}

#[tokio::test]
async fn rate_limit_is_retryable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/workflows/run"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "code": "too_many_requests",
            "message": "slow down",
        })))
        .mount(&mock_server)
        .await;

    let workflow = WorkflowClient::new(config(&mock_server)).expect("valid");
    let err = workflow.run(WorkflowRequest::new()).await.expect_err("should fail");
    assert_eq!(err.status(), Some(429));
    assert_eq!(err.code(), Some("too_many_requests"));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn malformed_success_body_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat-messages"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let err = chat(&mock_server)
        .send_message(ChatRequest::new("Hi"))
        .await
        .expect_err("should fail");
    assert!(matches!(err, DifyError::InvalidResponse(msg) if msg.contains("invalid JSON")));
}

#[tokio::test]
async fn slow_server_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/meta"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let chat = ChatClient::new(config(&mock_server).timeout(Duration::from_millis(200)))
        .expect("valid");
    let err = chat.meta("").await.expect_err("should time out");
    assert!(matches!(err, DifyError::Timeout(d) if d == Duration::from_millis(200)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    // Port 9 (discard) is closed on test machines.
    let chat = ChatClient::new(ClientConfig::new(API_KEY, "http://127.0.0.1:9")).expect("valid");
    let err = chat
        .send_message(ChatRequest::new("Hi"))
        .await
        .expect_err("should fail");
    assert!(matches!(err, DifyError::Network(_)));
    assert!(err.is_retryable());
}

#[derive(Clone, Default)]
struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("log lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn truncated_error_body_is_logged() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut chunk).await.expect("read");
            if n == 0 {
                return;
            }
            request.extend_from_slice(&chunk[..n]);
        }
        // Promises 100 bytes, sends 5, then hangs up.
        socket
            .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\noops!")
            .await
            .expect("write");
        socket.shutdown().await.expect("shutdown");
    });

    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let client = Client::new(ClientConfig::new(API_KEY, format!("http://{addr}"))).expect("valid");
    let err = client.parameters("alice").await.expect_err("should fail");
    assert!(matches!(&err, DifyError::Http { status: 500, body } if body.is_empty()));

    let logs = String::from_utf8_lossy(&logs.0.lock().expect("log lock")).into_owned();
    assert!(logs.contains("failed to read error response body"), "logs: {logs}");
}
