// crates/mutant-lab-providers/tests/common/mod.rs
// ============================================================================
// Module: Provider Test Helpers
// Description: Local fake of the Generative Language API.
// Purpose: Serve scripted model replies and capture outbound requests.
// ============================================================================

#![allow(dead_code, reason = "Helpers are shared across test binaries.")]

use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use mutant_lab_providers::GeminiConfig;
use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

/// Scripted reply for one model endpoint.
#[derive(Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn ok(body: &Value) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn status(status: u16, body: &Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

/// Request observed by the fake server.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub path: String,
    pub api_key: Option<String>,
    pub body: Value,
}

/// Fake API serving `generateContent` and `predict` routes.
pub struct FakeGemini {
    pub endpoint: String,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl FakeGemini {
    pub fn start(text: Reply, image: Reply) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);
        thread::spawn(move || {
            for _ in 0 .. 4 {
                let Ok(Some(mut request)) = server.recv_timeout(Duration::from_secs(10)) else {
                    break;
                };
                let mut raw = String::new();
                let _ = request.as_reader().read_to_string(&mut raw);
                let path = request.url().to_string();
                let api_key = request
                    .headers()
                    .iter()
                    .find(|header| header.field.equiv("x-goog-api-key"))
                    .map(|header| header.value.as_str().to_string());
                sink.lock().unwrap().push(CapturedRequest {
                    path: path.clone(),
                    api_key,
                    body: serde_json::from_str(&raw).unwrap_or(Value::Null),
                });
                let reply = if path.ends_with(":predict") { &image } else { &text };
                let response = Response::from_string(reply.body.clone())
                    .with_status_code(reply.status)
                    .with_header(
                        Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                            .unwrap(),
                    );
                let _ = request.respond(response);
            }
        });
        Self {
            endpoint: format!("http://{addr}"),
            captured,
        }
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().unwrap().clone()
    }

    pub fn config(&self) -> GeminiConfig {
        GeminiConfig {
            endpoint: self.endpoint.clone(),
            allow_http: true,
            timeout_ms: 5_000,
            ..GeminiConfig::new("test-key")
        }
    }
}

/// Creature details as the text model would emit them.
pub fn creature_json(name: &str) -> Value {
    json!({
        "name": name,
        "description": "A walking furnace bound to the lab.",
        "abilities": ["Magma fists", "Heat aura"],
        "weaknesses": ["Water"],
        "habitat": "Volcanic vents",
        "dangerLevel": 85,
        "simulatedHP": 4200,
        "attackPattern": "Charges, then erupts.",
        "onHitEffect": "Burns for three turns.",
        "imagePrompt": "photorealistic magma golem in a containment cell"
    })
}

/// Wraps `details` in a `generateContent` response envelope.
pub fn text_reply(details: &Value) -> Reply {
    Reply::ok(&json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": details.to_string()}]},
            "finishReason": "STOP"
        }]
    }))
}

/// A `predict` response carrying a three-byte JPEG header.
pub fn image_reply() -> Reply {
    Reply::ok(&json!({
        "predictions": [{"bytesBase64Encoded": "/9j/", "mimeType": "image/jpeg"}]
    }))
}
