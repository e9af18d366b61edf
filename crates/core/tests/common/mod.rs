// ═══════════════════════════════════════════════════════════════════
// Shared test helpers — an in-process HTTP responder and fixtures
// ═══════════════════════════════════════════════════════════════════

#![allow(dead_code)]

use chrono::NaiveDateTime;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use invest_tracker_core::models::asset::{Asset, AssetType};
use invest_tracker_core::models::transaction::{Transaction, TransactionType};

/// Route library logs to the test output. Set `RUST_LOG=debug` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    /// Path including the `/api` prefix and query string
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Recorded {
    /// Path below `/api`, without query.
    pub fn route(&self) -> &str {
        let path = self.target.split('?').next().unwrap_or("");
        path.strip_prefix("/api").unwrap_or(path)
    }

    pub fn query(&self) -> &str {
        self.target.split_once('?').map(|(_, q)| q).unwrap_or("")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub struct MockResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl MockResponse {
    pub fn json(status: u16, value: Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: serde_json::to_vec(&value).unwrap(),
        }
    }

    pub fn ok(value: Value) -> Self {
        Self::json(200, value)
    }

    pub fn bytes(status: u16, body: &[u8]) -> Self {
        Self {
            status,
            content_type: "application/octet-stream",
            body: body.to_vec(),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: Vec::new(),
        }
    }

    pub fn not_found() -> Self {
        Self::json(404, json!({ "message": "Not found" }))
    }
}

type Handler = Arc<dyn Fn(&Recorded) -> MockResponse + Send + Sync>;

/// Minimal HTTP/1.1 responder: one request per connection, then close.
pub struct MockServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&Recorded) -> MockResponse + Send + Sync + 'static,
    {
        init_tracing();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Handler = Arc::new(handler);

        let log = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let handler = Arc::clone(&handler);
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    let _ = read_request(stream, handler, log).await;
                });
            }
        });

        Self {
            base_url: format!("http://{addr}/api"),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

/// A base URL nothing listens on.
pub async fn dead_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

async fn read_request(
    mut stream: TcpStream,
    handler: Handler,
    log: Arc<Mutex<Vec<Recorded>>>,
) -> Option<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos;
        }
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok());
    let chunked = headers
        .iter()
        .any(|(k, v)| k == "transfer-encoding" && v.eq_ignore_ascii_case("chunked"));

    let mut body = buf[header_end + 4..].to_vec();
    if let Some(len) = content_length {
        while body.len() < len {
            let n = stream.read(&mut chunk).await.ok()?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..n]);
        }
        body.truncate(len);
    } else if chunked {
        while find(&body, b"0\r\n\r\n").is_none() {
            let n = stream.read(&mut chunk).await.ok()?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..n]);
        }
        body = decode_chunked(&body);
    }

    let recorded = Recorded {
        method,
        target,
        headers,
        body,
    };
    let response = handler(&recorded);
    log.lock().unwrap().push(recorded);

    let head = format!(
        "HTTP/1.1 {} Mock\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        response.content_type,
        response.body.len()
    );
    stream.write_all(head.as_bytes()).await.ok()?;
    stream.write_all(&response.body).await.ok()?;
    stream.shutdown().await.ok()?;
    Some(())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn decode_chunked(mut data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(line_end) = find(data, b"\r\n") {
        let size_hex = String::from_utf8_lossy(&data[..line_end]);
        let size = usize::from_str_radix(size_hex.trim(), 16).unwrap_or(0);
        if size == 0 {
            break;
        }
        let start = line_end + 2;
        out.extend_from_slice(&data[start..start + size]);
        data = &data[start + size + 2..];
    }
    out
}

// ═══════════════════════════════════════════════════════════════════
// Fixtures
// ═══════════════════════════════════════════════════════════════════

pub fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
}

pub fn asset(symbol: &str, name: &str, asset_type: AssetType) -> Asset {
    Asset::new(Uuid::new_v4(), symbol, name, asset_type)
}

pub fn tx(symbol: &str, kind: TransactionType, quantity: f64, price: f64, date: &str) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        portfolio_id: Uuid::nil(),
        asset_id: Uuid::nil(),
        asset_symbol: Some(symbol.to_string()),
        asset_name: None,
        transaction_type: kind,
        quantity,
        price,
        fee: 0.0,
        transaction_date: dt(date),
        notes: None,
        transfer_portfolio_id: None,
        created_at: None,
    }
}

pub fn asset_json(id: Uuid, symbol: &str, name: &str) -> Value {
    json!({
        "id": id,
        "symbol": symbol,
        "name": name,
        "assetType": "STOCK",
        "currency": "USD"
    })
}

pub fn portfolio_json(id: Uuid, name: &str, description: Option<&str>) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": description,
        "baseCurrency": "USD",
        "riskProfile": "MODERATE"
    })
}

pub fn transaction_json(id: Uuid, symbol: &str, kind: &str, quantity: f64, price: f64, date: &str) -> Value {
    json!({
        "id": id,
        "portfolioId": Uuid::nil(),
        "assetId": Uuid::nil(),
        "assetSymbol": symbol,
        "assetName": format!("{symbol} Inc."),
        "transactionType": kind,
        "quantity": quantity,
        "price": price,
        "fee": 0.0,
        "transactionDate": date
    })
}

pub fn alert_json(id: Uuid, triggered: bool) -> Value {
    let triggered_at = triggered.then_some("2024-03-01T10:00:00");
    json!({
        "id": id,
        "assetId": Uuid::nil(),
        "assetSymbol": "AAPL",
        "conditionType": "ABOVE",
        "targetPrice": 200.0,
        "currency": "USD",
        "isActive": true,
        "triggeredAt": triggered_at
    })
}
