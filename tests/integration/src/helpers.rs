//! Test helpers for integration tests
//!
//! Servers bind to port 0 so tests can run in parallel.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use dipcord_common::AppConfig;
use futures_util::{SinkExt, StreamExt};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

/// Default wait for a gateway frame
pub const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// REST API running on an ephemeral port
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()?).await
    }

    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = dipcord_api::create_app_state(config).await?;
        let app = dipcord_api::create_app(state)?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            _handle: handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("/health") {
            format!("{}{}", self.base_url(), path)
        } else {
            format!("{}/v1{}", self.base_url(), path)
        }
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.post(self.url(path)).json(body).send().await?)
    }

    pub async fn post_auth<T: Serialize>(&self, path: &str, token: &str, body: &T) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn patch_auth<T: Serialize>(&self, path: &str, token: &str, body: &T) -> Result<Response> {
        Ok(self
            .client
            .patch(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn put_auth<T: Serialize>(&self, path: &str, token: &str, body: &T) -> Result<Response> {
        Ok(self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }
}

/// WebSocket gateway running on an ephemeral port
pub struct TestGateway {
    pub addr: SocketAddr,
    _handle: JoinHandle<()>,
}

impl TestGateway {
    pub async fn start() -> Result<Self> {
        let state = dipcord_gateway::create_gateway_state(test_config()?).await?;
        let app = dipcord_gateway::create_app(state);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            _handle: handle,
        })
    }

    pub fn url(&self) -> String {
        format!("ws://{}/gateway", self.addr)
    }

    /// Connect and consume the Hello frame
    pub async fn connect(&self) -> Result<GatewayClient> {
        let (socket, _) = connect_async(self.url()).await?;
        let mut client = GatewayClient { socket };
        let hello = client.next_frame().await?;
        anyhow::ensure!(hello["op"] == 10, "expected Hello, got {hello}");
        Ok(client)
    }

    /// Connect, identify and return the client with its Ready payload
    pub async fn identify(&self, token: &str) -> Result<(GatewayClient, Value)> {
        let mut client = self.connect().await?;
        client.send(json!({"op": 2, "d": {"token": token}})).await?;
        let ready = client.next_dispatch("ready").await?;
        Ok((client, ready))
    }
}

pub struct GatewayClient {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl GatewayClient {
    pub async fn send(&mut self, frame: Value) -> Result<()> {
        self.socket.send(Message::Text(frame.to_string())).await?;
        Ok(())
    }

    /// Next text frame as JSON
    pub async fn next_frame(&mut self) -> Result<Value> {
        loop {
            let msg = tokio::time::timeout(FRAME_TIMEOUT, self.socket.next())
                .await
                .map_err(|_| anyhow::anyhow!("timed out waiting for a gateway frame"))?
                .ok_or_else(|| anyhow::anyhow!("gateway closed the socket"))??;
            match msg {
                Message::Text(text) => return Ok(serde_json::from_str(&text)?),
                Message::Close(frame) => anyhow::bail!("gateway closed the socket: {frame:?}"),
                _ => {}
            }
        }
    }

    /// Skip frames until a dispatch named `event_type` arrives, returning its data
    pub async fn next_dispatch(&mut self, event_type: &str) -> Result<Value> {
        loop {
            let frame = self.next_frame().await?;
            if frame["op"] == 0 && frame["t"] == event_type {
                return Ok(frame["d"].clone());
            }
        }
    }
}

/// Configuration from the environment, migrations on
pub fn test_config() -> Result<AppConfig> {
    let mut config = AppConfig::from_env().map_err(|e| anyhow::anyhow!("Config error: {e}"))?;
    config.database.run_migrations = true;
    Ok(config)
}

/// Both backing services must be reachable for these tests
pub fn check_test_env() -> bool {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }

    if std::env::var("REDIS_URL").is_err() {
        eprintln!("Skipping test: REDIS_URL not set");
        return false;
    }

    true
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}

/// Error code from an error body
pub async fn error_code(response: Response) -> Result<String> {
    let body: Value = response.json().await?;
    Ok(body["error"]["code"].as_str().unwrap_or_default().to_string())
}
