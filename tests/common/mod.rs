// Shared helpers for client tests: a scripted transport that records calls.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use testiny::{ApiRequest, ApiResponse, Client, ClientConfig, Transport};

#[derive(Default)]
struct Script {
    replies: VecDeque<ApiResponse>,
    sent: Vec<ApiRequest>,
}

/// Replies with queued responses in order and keeps every request it saw.
#[derive(Clone, Default)]
pub struct FakeTransport {
    script: Arc<Mutex<Script>>,
}

impl FakeTransport {
    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap()
    }

    pub fn reply(&self, status: u16, body: &str) -> &Self {
        self.script().replies.push_back(ApiResponse {
            status,
            body: body.to_string(),
        });
        self
    }

    pub fn reply_json(&self, body: Value) -> &Self {
        self.reply(200, &body.to_string())
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.script().sent.clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| match r.url.query() {
                Some(q) => format!("{} {}?{}", r.method, r.url.path(), q),
                None => format!("{} {}", r.method, r.url.path()),
            })
            .collect()
    }

    pub fn body(&self, index: usize) -> Value {
        let req = &self.requests()[index];
        serde_json::from_str(req.body.as_deref().expect("request has a body")).unwrap()
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: &ApiRequest) -> testiny::Result<ApiResponse> {
        let mut script = self.script();
        script.sent.push(request.clone());
        Ok(script
            .replies
            .pop_front()
            .expect("no scripted reply left for request"))
    }
}

pub fn config(key: Option<&str>) -> ClientConfig {
    ClientConfig {
        url: "https://testiny.example.com/".parse().unwrap(),
        key: key.map(str::to_string),
        verify: true,
        timeout: None,
    }
}

pub fn client_with(transport: &FakeTransport) -> Client {
    Client::new(config(Some("secret-key")))
        .unwrap()
        .with_transport(transport.clone())
}
