//! End-to-end delivery tests driving the real HTTP transport against a
//! local TCP fixture.

use chrono::NaiveDate;
use fact_outbox::{DeliveryError, Fact, FactSender, SenderConfig};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

fn sample_fact(value: i64) -> Fact {
    Fact {
        period_start: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
        period_end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        period_key: "month".to_string(),
        indicator_to_mo_id: 227_373,
        indicator_to_mo_fact_id: 0,
        value,
        fact_time: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        is_plan: false,
        auth_user_id: 40,
        comment: format!("buffer Last_name {}", value),
    }
}

fn config_for(addr: SocketAddr) -> SenderConfig {
    SenderConfig {
        endpoint: format!("http://{}/_api/facts/save_fact", addr),
        auth_token: "test-token".to_string(),
        max_attempts: 3,
        retry_delay: Duration::from_millis(10),
        attempt_timeout: Duration::from_secs(5),
    }
}

/// True once the headers and the content-length body have fully arrived.
fn request_complete(buf: &[u8]) -> bool {
    let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let headers = String::from_utf8_lossy(&buf[..header_end]);
    let content_length = headers
        .lines()
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .next()
        .unwrap_or(0);
    buf.len() >= header_end + 4 + content_length
}

/// Serves `n` requests with a fixed response, forwarding each raw request.
///
/// Responses carry `connection: close` so every attempt opens a fresh
/// connection.
async fn serve(
    listener: TcpListener,
    n: usize,
    status_line: &'static str,
    body: &'static str,
    requests: mpsc::UnboundedSender<String>,
) {
    for _ in 0..n {
        let (mut stream, _) = listener.accept().await.expect("accept");

        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let read = stream.read(&mut chunk).await.expect("read");
            buf.extend_from_slice(&chunk[..read]);
            if read == 0 || request_complete(&buf) {
                break;
            }
        }
        let _ = requests.send(String::from_utf8_lossy(&buf).into_owned());

        let response = format!(
            "HTTP/1.1 {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.expect("write");
        let _ = stream.shutdown().await;
    }
}

#[tokio::test]
async fn delivers_form_payload_with_bearer_auth() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let server = tokio::spawn(serve(listener, 1, "200 OK", "", tx));

    let sender = FactSender::new(config_for(addr));
    sender.send(&sample_fact(7)).await.unwrap();
    server.await.unwrap();

    let request = rx.recv().await.unwrap();
    let lower = request.to_lowercase();
    assert!(request.starts_with("POST /_api/facts/save_fact HTTP/1.1"));
    assert!(lower.contains("authorization: bearer test-token"));
    assert!(lower.contains("content-type: application/x-www-form-urlencoded"));

    let (_, request_body) = request.split_once("\r\n\r\n").unwrap();
    assert_eq!(
        request_body,
        "period_start=2024-12-01&period_end=2024-12-31&period_key=month\
         &indicator_to_mo_id=227373&indicator_to_mo_fact_id=0&value=7\
         &fact_time=2024-12-31&is_plan=0&auth_user_id=40\
         &comment=buffer+Last_name+7"
    );
}

#[tokio::test]
async fn rejected_responses_exhaust_the_attempt_budget() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let server = tokio::spawn(serve(listener, 3, "500 Internal Server Error", "err", tx));

    let sender = FactSender::new(config_for(addr));
    let err = sender.send(&sample_fact(1)).await.unwrap_err();
    server.await.unwrap();

    assert_eq!(err.attempts, 3);
    assert_eq!(
        err.last_error,
        DeliveryError::Rejected {
            status: 500,
            body: "err".to_string(),
        }
    );

    let mut attempts_seen = 0;
    while rx.try_recv().is_ok() {
        attempts_seen += 1;
    }
    assert_eq!(attempts_seen, 3);
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut config = config_for(addr);
    config.max_attempts = 1;
    config.retry_delay = Duration::from_millis(1);

    let sender = FactSender::new(config);
    let err = sender.send(&sample_fact(1)).await.unwrap_err();

    assert_eq!(err.attempts, 1);
    assert!(matches!(err.last_error, DeliveryError::Transport(_)));
}
