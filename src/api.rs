// api.rs

use crate::error::ApiError;
use crate::todo::{NewTodoDraft, TodoItem};
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;

/// The three calls the view makes against the todo service.
pub trait TodoApi: Send + Sync {
    /// `GET /todos`
    fn fetch_all(&self) -> Result<Vec<TodoItem>, ApiError>;
    /// `GET /todos/{day}`
    fn fetch_by_day(&self, day: &str) -> Result<Vec<TodoItem>, ApiError>;
    /// `POST /todos`
    fn create(&self, draft: &NewTodoDraft) -> Result<TodoItem, ApiError>;
}

pub struct HttpTodoApi {
    base: Url,
    client: Client,
}

impl HttpTodoApi {
    /// `timeout` of `None` lets requests wait indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let base = Url::parse(base_url.trim())
            .map_err(|_| ApiError::InvalidBaseUrl(base_url.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { base, client })
    }

    fn todos_url(&self, day: Option<&str>) -> Url {
        let mut url = self.base.clone();
        // cannot_be_a_base was ruled out in new()
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("todos");
            if let Some(day) = day {
                segments.push(day);
            }
        }
        url
    }

    fn send(&self, method: &str, url: &Url, req: RequestBuilder) -> Result<String, ApiError> {
        log::debug!("[HTTP OUT] {} {}", method, url);
        let resp = req.header(ACCEPT, "application/json").send()?;
        let status = resp.status();
        let text = resp.text()?;
        log::debug!("[HTTP IN] {} {} -> {} ({} bytes)", method, url, status, text.len());
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }
        Ok(text)
    }

    fn get_list(&self, url: Url) -> Result<Vec<TodoItem>, ApiError> {
        let text = self.send("GET", &url, self.client.get(url.clone()))?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl TodoApi for HttpTodoApi {
    fn fetch_all(&self) -> Result<Vec<TodoItem>, ApiError> {
        self.get_list(self.todos_url(None))
    }

    fn fetch_by_day(&self, day: &str) -> Result<Vec<TodoItem>, ApiError> {
        self.get_list(self.todos_url(Some(day)))
    }

    fn create(&self, draft: &NewTodoDraft) -> Result<TodoItem, ApiError> {
        let url = self.todos_url(None);
        let text = self.send("POST", &url, self.client.post(url.clone()).json(draft))?;
        let mut v: Value = serde_json::from_str(&text)?;
        // some backends wrap the created record as {"item": {...}}
        if let Some(item) = v.get_mut("item").map(Value::take) {
            v = item;
        }
        Ok(serde_json::from_value(v)?)
    }
}
