//! Integration tests for the Ollama client and capability resolver,
//! backed by a mock server speaking the Ollama wire format.

use futures_util::StreamExt;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use modelscout_client::{CapabilityResolver, Error, OllamaClient};
use modelscout_common::{Capability, ChatMessage, ChatRequest, EmbedRequest, GenerateRequest};

fn tags_payload() -> serde_json::Value {
    json!({
        "models": [
            {
                "name": "llama3.2",
                "size": 2019393189u64,
                "digest": "a80c4f17acd5",
                "modified_at": "2025-06-01T12:00:00Z",
                "details": {
                    "family": "llama",
                    "parameter_size": "3.2B",
                    "quantization_level": "Q4_K_M"
                }
            },
            {
                "name": "nomic-embed-text",
                "size": 274302450u64,
                "digest": "0a109f422b47",
                "modified_at": "2025-05-20T08:30:00Z"
            },
            {
                "name": "llava-vision",
                "size": 4733363377u64,
                "digest": "8dd30f6b0cb1",
                "modified_at": "2025-04-11T19:45:00Z"
            }
        ]
    })
}

async fn mock_tags(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tags_payload()))
        .mount(server)
        .await;
}

// ============================================================================
// Status probe
// ============================================================================

#[tokio::test]
async fn test_status_reports_model_count() {
    let server = MockServer::start().await;
    mock_tags(&server).await;

    let client = OllamaClient::new(&server.uri());
    let status = client.status().await;

    assert!(status.reachable);
    assert_eq!(status.model_count, 3);
}

#[tokio::test]
async fn test_status_never_fails_when_unreachable() {
    // Nothing is listening on this port.
    let client = OllamaClient::new("http://127.0.0.1:1");
    let status = client.status().await;

    assert!(!status.reachable);
    assert_eq!(status.model_count, 0);
}

#[tokio::test]
async fn test_status_down_on_garbage_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server.uri());
    let status = client.status().await;

    assert!(!status.reachable);
    assert_eq!(status.model_count, 0);
}

// ============================================================================
// Model listing and metadata
// ============================================================================

#[tokio::test]
async fn test_list_models_parses_descriptors() {
    let server = MockServer::start().await;
    mock_tags(&server).await;

    let client = OllamaClient::new(&server.uri());
    let models = client.list_models().await.unwrap();

    assert_eq!(models.len(), 3);
    let llama = models.iter().find(|m| m.name == "llama3.2").unwrap();
    assert_eq!(llama.size, 2019393189);
    assert_eq!(llama.digest.as_deref(), Some("a80c4f17acd5"));
    assert_eq!(
        llama
            .details
            .as_ref()
            .and_then(|d| d.parameter_size.as_deref()),
        Some("3.2B")
    );
}

#[tokio::test]
async fn test_list_models_empty_when_unreachable() {
    let client = OllamaClient::new("http://127.0.0.1:1");
    let models = client.list_models().await.unwrap();
    assert!(models.is_empty());
}

#[tokio::test]
async fn test_list_models_malformed_payload_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"models\": 42}"))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server.uri());
    let err = client.list_models().await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse(_)));
}

#[tokio::test]
async fn test_list_models_is_idempotent() {
    let server = MockServer::start().await;
    mock_tags(&server).await;

    let client = OllamaClient::new(&server.uri());
    let mut first: Vec<String> = client
        .list_models()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    let mut second: Vec<String> = client
        .list_models()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();

    first.sort();
    second.sort();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_model_info_returns_extended_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/show"))
        .and(body_partial_json(json!({"model": "llama3.2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "template": "{{ .Prompt }}",
            "system": "You are a helpful assistant.",
            "parameters": "stop \"<|eot_id|>\"",
            "details": {"family": "llama", "parameter_size": "3.2B"},
            "capabilities": ["completion", "tools"]
        })))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server.uri());
    let info = client.model_info("llama3.2").await.unwrap();

    assert_eq!(info.template.as_deref(), Some("{{ .Prompt }}"));
    assert_eq!(info.system.as_deref(), Some("You are a helpful assistant."));
    assert_eq!(info.parameters.as_deref(), Some("stop \"<|eot_id|>\""));
    assert_eq!(
        info.capabilities,
        Some(vec!["completion".to_string(), "tools".to_string()])
    );
}

#[tokio::test]
async fn test_model_info_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/show"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "model 'nope' not found"})),
        )
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server.uri());
    let err = client.model_info("nope").await.unwrap_err();
    assert!(matches!(err, Error::ModelNotFound(name) if name == "nope"));
}

// ============================================================================
// Generation
// ============================================================================

#[tokio::test]
async fn test_generate_non_streaming() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({"model": "llama3.2", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.2",
            "created_at": "2025-06-01T12:00:00Z",
            "response": "Hello there",
            "done": true,
            "total_duration": 512000000u64,
            "eval_count": 5
        })))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server.uri());
    let response = client
        .generate(&GenerateRequest::new("llama3.2", "Say hello"))
        .await
        .unwrap();

    assert_eq!(response.text, "Hello there");
    assert_eq!(response.model, "llama3.2");
    assert!(response.done);
    assert_eq!(response.timing.eval_count, Some(5));
}

#[tokio::test]
async fn test_generate_stream_concatenates_to_full_text() {
    let server = MockServer::start().await;

    let ndjson = concat!(
        "{\"model\":\"llama3.2\",\"response\":\"Hel\",\"done\":false}\n",
        "{\"model\":\"llama3.2\",\"response\":\"lo ther\",\"done\":false}\n",
        "{\"model\":\"llama3.2\",\"response\":\"e\",\"done\":true,\"eval_count\":5}\n",
    );
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ndjson, "application/x-ndjson"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({"stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.2",
            "response": "Hello there",
            "done": true
        })))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server.uri());
    let request = GenerateRequest::new("llama3.2", "Say hello");

    let mut stream = client.generate_stream(&request).await.unwrap();
    let mut assembled = String::new();
    let mut saw_done = false;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.unwrap();
        assembled.push_str(&chunk.text);
        saw_done = chunk.done;
    }

    let full = client.generate(&request).await.unwrap();

    assert!(saw_done);
    assert_eq!(assembled, "Hello there");
    assert_eq!(assembled, full.text);
}

#[tokio::test]
async fn test_generate_stream_partial_consumption() {
    let server = MockServer::start().await;
    let ndjson = concat!(
        "{\"model\":\"llama3.2\",\"response\":\"a\",\"done\":false}\n",
        "{\"model\":\"llama3.2\",\"response\":\"b\",\"done\":true}\n",
    );
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ndjson, "application/x-ndjson"))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server.uri());
    let mut stream = client
        .generate_stream(&GenerateRequest::new("llama3.2", "go"))
        .await
        .unwrap();

    // Read one chunk, then walk away; dropping the stream must be fine.
    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.text, "a");
    drop(stream);
}

#[tokio::test]
async fn test_server_error_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server.uri());
    let err = client
        .generate(&GenerateRequest::new("llama3.2", "hi"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Server { status: 500, message } if message == "boom"
    ));
}

// ============================================================================
// Chat
// ============================================================================

#[tokio::test]
async fn test_chat_non_streaming_answers_as_assistant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "messages": [{"role": "user", "content": "hi"}],
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.2",
            "created_at": "2025-06-01T12:00:00Z",
            "message": {"role": "assistant", "content": "Hello!"},
            "done": true,
            "prompt_eval_count": 10,
            "eval_count": 3
        })))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server.uri());
    let response = client
        .chat(&ChatRequest::new("llama3.2", vec![ChatMessage::user("hi")]))
        .await
        .unwrap();

    assert_eq!(response.message.role, "assistant");
    assert_eq!(response.message.content, "Hello!");
    assert!(response.done);
    assert_eq!(response.timing.prompt_eval_count, Some(10));
}

#[tokio::test]
async fn test_chat_stream_assembles_message() {
    let server = MockServer::start().await;
    let ndjson = concat!(
        "{\"model\":\"llama3.2\",\"message\":{\"role\":\"assistant\",\"content\":\"He\"},\"done\":false}\n",
        "{\"model\":\"llama3.2\",\"message\":{\"role\":\"assistant\",\"content\":\"llo\"},\"done\":false}\n",
        "{\"model\":\"llama3.2\",\"message\":{\"role\":\"assistant\",\"content\":\"!\"},\"done\":true}\n",
    );
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ndjson, "application/x-ndjson"))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server.uri());
    let mut stream = client
        .chat_stream(&ChatRequest::new(
            "llama3.2",
            vec![ChatMessage::user("hi")],
        ))
        .await
        .unwrap();

    let mut assembled = String::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.unwrap();
        assert_eq!(chunk.message.role, "assistant");
        assembled.push_str(&chunk.message.content);
    }

    assert_eq!(assembled, "Hello!");
}

#[tokio::test]
async fn test_chat_rejects_empty_messages_without_network_call() {
    let server = MockServer::start().await;

    let client = OllamaClient::new(&server.uri());
    let err = client
        .chat(&ChatRequest::new("llama3.2", vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    let err = client
        .chat_stream(&ChatRequest::new("llama3.2", vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    assert!(server.received_requests().await.unwrap().is_empty());
}

// ============================================================================
// Embeddings
// ============================================================================

#[tokio::test]
async fn test_embeddings_returns_vector() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .and(body_partial_json(json!({
            "model": "nomic-embed-text",
            "prompt": "Artificial intelligence is transforming the world."
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embedding": [0.1, -0.2, 0.3]
        })))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server.uri());
    let response = client
        .embeddings(&EmbedRequest::new(
            "nomic-embed-text",
            "Artificial intelligence is transforming the world.",
        ))
        .await
        .unwrap();

    assert_eq!(response.model, "nomic-embed-text");
    assert_eq!(response.embedding.len(), 3);
    assert!((response.embedding[0] - 0.1).abs() < f32::EPSILON);
}

#[tokio::test]
async fn test_embeddings_rejects_empty_text_without_network_call() {
    let server = MockServer::start().await;

    let client = OllamaClient::new(&server.uri());
    let err = client
        .embeddings(&EmbedRequest::new("nomic-embed-text", ""))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ============================================================================
// Capability resolver
// ============================================================================

#[tokio::test]
async fn test_build_index_classifies_by_name() {
    let server = MockServer::start().await;
    mock_tags(&server).await;

    let client = OllamaClient::new(&server.uri());
    let resolver = CapabilityResolver::new(client);
    let index = resolver.build_index().await.unwrap();

    assert_eq!(index.summary.total_models, 3);
    assert_eq!(index.embedding.len(), 1);
    assert_eq!(index.embedding[0].name, "nomic-embed-text");
    assert_eq!(index.vision.len(), 1);
    assert_eq!(index.vision[0].name, "llava-vision");
    assert_eq!(index.chat.len(), 1);
    assert_eq!(index.chat[0].name, "llama3.2");
    assert!(index.tools.is_empty());
    assert!(index.thinking.is_empty());
}

#[tokio::test]
async fn test_models_with_capabilities_only_emits_known_tags() {
    let server = MockServer::start().await;
    mock_tags(&server).await;

    let client = OllamaClient::new(&server.uri());
    let resolver = CapabilityResolver::new(client);
    let tagged = resolver.models_with_capabilities().await.unwrap();

    assert_eq!(tagged.len(), 3);
    for entry in &tagged {
        assert!(!entry.capabilities.is_empty());
        for tag in &entry.capabilities {
            assert!(Capability::ALL.contains(tag));
        }
    }
}

#[tokio::test]
async fn test_list_by_capability_filters() {
    let server = MockServer::start().await;
    mock_tags(&server).await;

    let client = OllamaClient::new(&server.uri());
    let resolver = CapabilityResolver::new(client);

    let embedding = resolver
        .list_by_capability(Capability::Embedding)
        .await
        .unwrap();
    assert_eq!(embedding.len(), 1);
    assert_eq!(embedding[0].name, "nomic-embed-text");

    let thinking = resolver
        .list_by_capability(Capability::Thinking)
        .await
        .unwrap();
    assert!(thinking.is_empty());
}

#[tokio::test]
async fn test_list_by_capability_named_rejects_unknown_tag() {
    let server = MockServer::start().await;

    let client = OllamaClient::new(&server.uri());
    let resolver = CapabilityResolver::new(client);
    let err = resolver
        .list_by_capability_named("not_a_real_tag")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidArgument(_)));
    // Rejected before the listing was ever fetched.
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_resolver_uses_reported_capabilities_when_present() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                {"name": "mystery-model", "capabilities": ["completion", "tools"]}
            ]
        })))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server.uri());
    let resolver = CapabilityResolver::new(client);

    let tools = resolver.list_by_capability(Capability::Tools).await.unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "mystery-model");

    let index = resolver.build_index().await.unwrap();
    assert_eq!(index.summary.tools_count, 1);
    assert_eq!(index.summary.chat_count, 1);
    assert_eq!(index.summary.embedding_count, 0);
}
