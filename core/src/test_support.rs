//! Test doubles shared across the crate's unit tests.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::api::ApiClient;
use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::screens::{Alerts, Navigator, Route};
use crate::token::TokenStore;
use crate::transport::Transport;

/// Replays queued responses in order and records every request it sees.
#[derive(Default)]
pub struct FakeTransport {
    requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<Result<HttpResponse, String>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) {
        self.responses.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }));
    }

    pub fn fail(&self, reason: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(reason.to_string()));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(reason)) => Err(TransportError::Send(reason)),
            None => Err(TransportError::Send("no response queued".to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    Navigate(Route),
    Reset(Route),
}

#[derive(Default)]
pub struct RecordingNavigator {
    events: Mutex<Vec<NavEvent>>,
}

impl RecordingNavigator {
    pub fn events(&self) -> Vec<NavEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.events.lock().unwrap().push(NavEvent::Navigate(route));
    }

    fn reset(&self, route: Route) {
        self.events.lock().unwrap().push(NavEvent::Reset(route));
    }
}

/// Records alerts; answers every confirm dialog with `confirm_answer`.
pub struct RecordingAlerts {
    shown: Mutex<Vec<(String, String)>>,
    confirm_answer: bool,
}

impl RecordingAlerts {
    pub fn new(confirm_answer: bool) -> Self {
        Self {
            shown: Mutex::new(Vec::new()),
            confirm_answer,
        }
    }

    pub fn shown(&self) -> Vec<(String, String)> {
        self.shown.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<(String, String)> {
        self.shown.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Alerts for RecordingAlerts {
    fn show(&self, title: &str, message: &str) {
        self.shown
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
    }

    async fn confirm(&self, _title: &str, _message: &str) -> bool {
        self.confirm_answer
    }
}

/// Everything a controller test needs, wired to one fake transport.
pub struct Harness {
    pub transport: Arc<FakeTransport>,
    pub tokens: TokenStore,
    pub api: ApiClient,
    pub navigator: Arc<RecordingNavigator>,
    pub alerts: Arc<RecordingAlerts>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_confirm(true)
    }

    pub fn with_confirm(confirm_answer: bool) -> Self {
        let transport = Arc::new(FakeTransport::new());
        let tokens = TokenStore::in_memory();
        let api = ApiClient::new("http://api.test", transport.clone(), Arc::new(tokens.clone()));
        Self {
            transport,
            tokens,
            api,
            navigator: Arc::new(RecordingNavigator::default()),
            alerts: Arc::new(RecordingAlerts::new(confirm_answer)),
        }
    }
}

pub fn book_json(id: &str, title: &str) -> String {
    format!(
        r#"{{"_id":"{id}","title":"{title}","author":"Frank Herbert","description":"Desert planet saga","genre":"SF"}}"#
    )
}

pub fn books_body(books: &[(&str, &str)]) -> String {
    let items: Vec<String> = books.iter().map(|(id, title)| book_json(id, title)).collect();
    format!(r#"{{"success":true,"data":[{}]}}"#, items.join(","))
}
