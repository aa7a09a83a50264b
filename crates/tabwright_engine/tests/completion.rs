use serde_json::json;
use tabwright_engine::{
    CompletionError, CompletionRequest, CompletionSettings, OpenAiCompletion, TextCompletion,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OpenAiCompletion {
    let settings = CompletionSettings {
        base_url: format!("{}/v1", server.uri()),
        ..CompletionSettings::new("test-key")
    };
    OpenAiCompletion::new(settings).expect("client")
}

fn reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "model": "gpt-5-nano",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    }))
}

#[tokio::test]
async fn completion_posts_chat_request_with_bearer_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-5-nano",
            "messages": [
                { "role": "system", "content": "Be brief." },
                { "role": "user", "content": "Summarize this." }
            ]
        })))
        .respond_with(reply("  A **short** summary. \n"))
        .expect(1)
        .mount(&server)
        .await;

    let text = client_for(&server)
        .complete(CompletionRequest::new(
            "gpt-5-nano",
            "Be brief.",
            "Summarize this.",
        ))
        .await
        .expect("completion ok");
    assert_eq!(text, "A **short** summary.");
}

#[tokio::test]
async fn json_requests_ask_for_json_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "response_format": { "type": "json_object" }
        })))
        .respond_with(reply("{\"recommended_windows\": []}"))
        .expect(1)
        .mount(&server)
        .await;

    let text = client_for(&server)
        .complete(CompletionRequest::new("gpt-4o", "sys", "user").json_object())
        .await
        .expect("completion ok");
    assert!(text.starts_with('{'));
}

#[tokio::test]
async fn api_errors_carry_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .complete(CompletionRequest::new("m", "s", "u"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        CompletionError::Api {
            status: 429,
            message: "rate limited".into()
        }
    );
}

#[tokio::test]
async fn blank_content_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply("   "))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .complete(CompletionRequest::new("m", "s", "u"))
        .await
        .unwrap_err();
    assert_eq!(err, CompletionError::EmptyResponse);
}
