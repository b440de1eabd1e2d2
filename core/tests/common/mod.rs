//! In-memory transport that records every request and replays a scripted
//! response.

#![allow(dead_code)]

use std::future::Future;
use std::sync::{Arc, Mutex};

use getter_core::{HttpRequest, HttpResponse, Params, Transport, TransportError};

/// Scripted outcome for every call.
#[derive(Clone)]
pub enum Reply {
    Respond(HttpResponse),
    Fail,
}

#[derive(Clone)]
pub struct RecordingTransport {
    reply: Reply,
    sent: Arc<Mutex<Vec<HttpRequest>>>,
}

impl RecordingTransport {
    pub fn responding(status: u16, body: &str) -> Self {
        let headers = Params::new().with("content-type", "application/json");
        Self::with_reply(Reply::Respond(HttpResponse::new(status, headers, body.to_string())))
    }

    pub fn failing() -> Self {
        Self::with_reply(Reply::Fail)
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Remove and return the single recorded request.
    pub fn take_only(&self) -> HttpRequest {
        let mut sent = self.sent.lock().unwrap();
        assert_eq!(sent.len(), 1, "expected exactly one request");
        sent.remove(0)
    }
}

impl Transport for RecordingTransport {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        self.sent.lock().unwrap().push(request);
        let outcome = match &self.reply {
            Reply::Respond(response) => Ok(response.clone()),
            Reply::Fail => Err(TransportError::Connect("connection refused".to_string())),
        };
        async move { outcome }
    }
}
