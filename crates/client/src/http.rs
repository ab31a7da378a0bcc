use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use todo_core::api::{TaskActions, TaskApi};
use todo_core::live::{LivePublisher, LiveTasks};
use todo_core::task::{Task, TaskId};
use todo_core::{Error, Result};

use crate::sse::SseParser;

pub const API_URL_ENV: &str = "TODO_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:8081";

/// SSE event name carrying a full snapshot
const TODOS_EVENT: &str = "todos";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(API_URL_ENV) {
            Some(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[derive(Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct CreatedResponse {
    id: TaskId,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Remote [`TaskApi`] speaking to the server's REST surface
///
/// The live list is fed by a background task that follows
/// `/api/todos/events`. When that stream ends the list reports
/// [`Error::Disconnected`]; it is not reopened.
pub struct HttpTaskApi {
    client: Client,
    config: ClientConfig,
    live: LiveTasks,
    subscription: JoinHandle<()>,
}

impl HttpTaskApi {
    /// Connect to the server and start following the live list
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect(config: ClientConfig) -> Self {
        let client = Client::builder()
            .no_proxy()
            .build()
            .unwrap_or_else(|_| Client::new());

        let publisher = LivePublisher::loading();
        let live = publisher.subscribe();
        let subscription = tokio::spawn(follow_events(
            client.clone(),
            config.url("/api/todos/events"),
            publisher,
        ));

        info!("Connected task API to {}", config.base_url);
        Self {
            client,
            config,
            live,
            subscription,
        }
    }

    pub fn from_env() -> Self {
        Self::connect(ClientConfig::from_env())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let res = request
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Failed to reach server: {}", e)))?;
        check_status(res).await
    }
}

impl Drop for HttpTaskApi {
    fn drop(&mut self) {
        self.subscription.abort();
    }
}

#[async_trait]
impl TaskActions for HttpTaskApi {
    async fn toggle(&self, id: TaskId) -> Result<()> {
        let url = self.config.url(&format!("/api/todos/{}/toggle", id));
        self.send(self.client.post(url))
            .await
            .map_err(for_task(id))?;
        Ok(())
    }

    async fn remove(&self, id: TaskId) -> Result<()> {
        let url = self.config.url(&format!("/api/todos/{}", id));
        self.send(self.client.delete(url))
            .await
            .map_err(for_task(id))?;
        Ok(())
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn create(&self, text: String) -> Result<TaskId> {
        let request = self
            .client
            .post(self.config.url("/api/todos"))
            .json(&TextRequest { text: &text });
        let res = self.send(request).await?;
        let created: CreatedResponse = res
            .json()
            .await
            .map_err(|e| Error::Transport(format!("Invalid create response: {}", e)))?;
        Ok(created.id)
    }

    async fn update(&self, id: TaskId, text: String) -> Result<()> {
        let request = self
            .client
            .patch(self.config.url(&format!("/api/todos/{}", id)))
            .json(&TextRequest { text: &text });
        self.send(request).await.map_err(for_task(id))?;
        Ok(())
    }

    fn list(&self) -> LiveTasks {
        self.live.clone()
    }
}

async fn check_status(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .unwrap_or(body);
    Err(Error::Remote {
        status: status.as_u16(),
        message,
    })
}

/// Report a 404 on an item route the same way the local store does
fn for_task(id: TaskId) -> impl FnOnce(Error) -> Error {
    move |e| match e {
        Error::Remote { status: 404, .. } => Error::TaskNotFound(id.to_string()),
        other => other,
    }
}

async fn follow_events(client: Client, url: String, publisher: LivePublisher) {
    match stream_snapshots(&client, &url, &publisher).await {
        Ok(()) => info!("Live list stream closed by server"),
        Err(e) => warn!("Live list stream failed: {}", e),
    }
}

async fn stream_snapshots(client: &Client, url: &str, publisher: &LivePublisher) -> Result<()> {
    let res = client
        .get(url)
        .header(header::ACCEPT, "text/event-stream")
        .send()
        .await
        .map_err(|e| Error::Transport(format!("Failed to open live list: {}", e)))?;
    let res = check_status(res).await?;

    let mut stream = res.bytes_stream();
    let mut parser = SseParser::new();

    while let Some(item) = stream.next().await {
        let chunk: bytes::Bytes =
            item.map_err(|e| Error::Transport(format!("Stream error: {}", e)))?;

        for message in parser.push(&chunk)? {
            if message.event_name() != TODOS_EVENT {
                continue;
            }
            match serde_json::from_str::<Vec<Task>>(&message.data) {
                Ok(tasks) => {
                    debug!("Received snapshot of {} tasks", tasks.len());
                    publisher.publish(tasks);
                }
                Err(e) => warn!("Ignoring malformed snapshot: {}", e),
            }
        }
    }
    Ok(())
}
