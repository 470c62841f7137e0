//! Remote todo collection: the store seam and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Todo, TodoId, UserId},
    error::ApiError,
    protocol::{CreateTodoRequest, ListTodosQuery, UpdateTodoRequest},
};
use tracing::debug;
use url::Url;

use crate::error::RemoteError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One round trip per call, no retries.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Owner every todo in this store belongs to.
    fn owner(&self) -> UserId;
    async fn list(&self) -> Result<Vec<Todo>, RemoteError>;
    async fn create(&self, title: &str, completed: bool) -> Result<Todo, RemoteError>;
    async fn update(&self, todo: &Todo) -> Result<Todo, RemoteError>;
    async fn delete(&self, id: TodoId) -> Result<(), RemoteError>;
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_url: Url,
    pub owner: UserId,
    pub request_timeout: Duration,
}

impl StoreConfig {
    pub fn new(base_url: Url, owner: UserId) -> Self {
        Self {
            base_url,
            owner,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

pub struct HttpTodoStore {
    http: Client,
    base_url: String,
    owner: UserId,
}

impl HttpTodoStore {
    pub fn new(config: StoreConfig) -> Result<Self, RemoteError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| RemoteError::Transport {
                method: "INIT",
                url: config.base_url.to_string(),
                source,
            })?;
        Ok(Self::with_client(http, config.base_url, config.owner))
    }

    pub fn with_client(http: Client, base_url: Url, owner: UserId) -> Self {
        Self {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            owner,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn item_url(&self, id: TodoId) -> String {
        format!("{}/todos/{}", self.base_url, id.0)
    }

    async fn send(
        &self,
        method: Method,
        url: String,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<(Response, &'static str, String), RemoteError> {
        let method_name = method_name(&method);
        debug!(method = method_name, %url, "todo store request");
        let res = build(self.http.request(method, &url))
            .send()
            .await
            .map_err(|source| RemoteError::Transport {
                method: method_name,
                url: url.clone(),
                source,
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.json::<ApiError>().await.ok();
            return Err(RemoteError::Status {
                method: method_name,
                url,
                status: status.as_u16(),
                body,
            });
        }
        Ok((res, method_name, url))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<T, RemoteError> {
        let (res, method, url) = self.send(method, url, build).await?;
        res.json()
            .await
            .map_err(|source| RemoteError::Decode { method, url, source })
    }
}

fn method_name(method: &Method) -> &'static str {
    if *method == Method::GET {
        "GET"
    } else if *method == Method::POST {
        "POST"
    } else if *method == Method::PATCH {
        "PATCH"
    } else if *method == Method::DELETE {
        "DELETE"
    } else {
        "HTTP"
    }
}

fn ensure_persisted(todo: Todo) -> Result<Todo, RemoteError> {
    if todo.id.is_placeholder() {
        return Err(RemoteError::MalformedTodo(format!(
            "todo '{}' has no server-assigned id",
            todo.title
        )));
    }
    Ok(todo)
}

#[async_trait]
impl TodoStore for HttpTodoStore {
    fn owner(&self) -> UserId {
        self.owner
    }

    async fn list(&self) -> Result<Vec<Todo>, RemoteError> {
        let query = ListTodosQuery {
            user_id: self.owner,
        };
        self.send_json(Method::GET, self.collection_url(), |req| req.query(&query))
            .await
    }

    async fn create(&self, title: &str, completed: bool) -> Result<Todo, RemoteError> {
        let body = CreateTodoRequest {
            title: title.to_string(),
            completed,
            user_id: self.owner,
        };
        let todo = self
            .send_json(Method::POST, self.collection_url(), |req| req.json(&body))
            .await?;
        ensure_persisted(todo)
    }

    async fn update(&self, todo: &Todo) -> Result<Todo, RemoteError> {
        let body = UpdateTodoRequest::from(todo);
        let updated = self
            .send_json(Method::PATCH, self.item_url(todo.id), |req| req.json(&body))
            .await?;
        ensure_persisted(updated)
    }

    async fn delete(&self, id: TodoId) -> Result<(), RemoteError> {
        self.send(Method::DELETE, self.item_url(id), |req| req)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
