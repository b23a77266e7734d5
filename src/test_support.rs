// Test doubles shared by unit tests.
// A scripted transport standing in for the backend and a renderer that records calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::api::{Feed, Item, RawResponse, Transport};
use crate::error::{Result, RillError};
use crate::state::{Controls, Notice, Renderer, View};

/// A request seen by the scripted transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
enum Scripted {
    Respond(StatusCode, String),
    Fail(String),
}

/// In-memory backend: replies are scripted per method and path. Unscripted paths get a 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(&'static str, String), Scripted>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn script(&self, method: &'static str, path: &str, reply: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), reply);
    }

    /// Replace the reply for GET `path`.
    pub fn on_get(&self, path: &str, status: u16, body: Value) {
        let status = StatusCode::from_u16(status).unwrap();
        self.script("GET", path, Scripted::Respond(status, body.to_string()));
    }

    /// Replace the reply for POST `path`, with an empty JSON object body.
    pub fn on_post(&self, path: &str, status: u16) {
        let status = StatusCode::from_u16(status).unwrap();
        self.script("POST", path, Scripted::Respond(status, "{}".to_string()));
    }

    pub fn fail_get(&self, path: &str, message: &str) {
        self.script("GET", path, Scripted::Fail(message.to_string()));
    }

    pub fn fail_post(&self, path: &str, message: &str) {
        self.script("POST", path, Scripted::Fail(message.to_string()));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.method == method && call.path == path)
            .count()
    }

    fn respond(&self, method: &'static str, path: &str, body: Option<Value>) -> Result<RawResponse> {
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.to_string(),
            body,
        });
        let reply = self
            .routes
            .lock()
            .unwrap()
            .get(&(method, path.to_string()))
            .cloned();
        match reply {
            Some(Scripted::Respond(status, body)) => Ok(RawResponse::new(status, body)),
            Some(Scripted::Fail(message)) => Err(RillError::Other(message)),
            None => Ok(RawResponse::new(
                StatusCode::NOT_FOUND,
                r#"{"code":"404","name":"Not Found","message":"not found"}"#,
            )),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, path: &str) -> Result<RawResponse> {
        self.respond("GET", path, None)
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<RawResponse> {
        self.respond("POST", path, body)
    }
}

/// A renderer call, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Content(View),
    Controls(Option<Controls>),
    Notice(Notice),
}

#[derive(Default)]
pub struct RecordingRenderer {
    events: Mutex<Vec<Rendered>>,
}

impl RecordingRenderer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Rendered> {
        self.events.lock().unwrap().clone()
    }

    pub fn last_content(&self) -> Option<View> {
        self.events().into_iter().rev().find_map(|event| match event {
            Rendered::Content(view) => Some(view),
            _ => None,
        })
    }

    /// Message of the current content, if it is an error.
    pub fn last_error(&self) -> Option<String> {
        match self.last_content() {
            Some(View::Error(message)) => Some(message),
            _ => None,
        }
    }

    /// Most recent visible controls; `None` if the last reset hid them or none happened.
    pub fn last_controls(&self) -> Option<Controls> {
        self.events()
            .into_iter()
            .rev()
            .find_map(|event| match event {
                Rendered::Controls(controls) => Some(controls),
                _ => None,
            })
            .flatten()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Rendered::Notice(notice) => Some(notice),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn set_content(&self, view: View) {
        self.events.lock().unwrap().push(Rendered::Content(view));
    }

    fn reset_controls(&self, controls: Option<Controls>) {
        self.events.lock().unwrap().push(Rendered::Controls(controls));
    }

    fn notify(&self, notice: Notice) {
        self.events.lock().unwrap().push(Rendered::Notice(notice));
    }
}

pub fn feed(uid: &str, name: &str) -> Feed {
    Feed {
        uid: uid.to_string(),
        name: name.to_string(),
        ..Feed::default()
    }
}

pub fn feed_with_items(uid: &str, read_count: u64, items: Vec<Item>) -> Feed {
    Feed {
        uid: uid.to_string(),
        name: format!("Feed {uid}"),
        item_count: items.len() as u64,
        read_count,
        items,
        ..Feed::default()
    }
}

/// An unread item owned by `feed_uid`.
pub fn item(feed_uid: &str, uid: &str) -> Item {
    Item {
        uid: uid.to_string(),
        feed_uid: feed_uid.to_string(),
        feed_name: format!("Feed {feed_uid}"),
        title: format!("Item {uid}"),
        ..Item::default()
    }
}
