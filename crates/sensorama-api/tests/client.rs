//! Integration tests for the API client against a throwaway HTTP server.
//!
//! The stub speaks just enough HTTP/1.1 to answer one request per
//! connection with a canned status and body, and hands every request it
//! saw back to the test.

use std::time::Duration;

use sensorama_api::{
    ApiClient, ApiConfig, ApiError, Credentials, RegistrationRequest, UpdateProfile,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

#[derive(Debug)]
struct Captured {
    method: String,
    target: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

async fn read_request(stream: &mut TcpStream) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap().split(' ');
    let method = request_line.next().unwrap().to_owned();
    let target = request_line.next().unwrap().to_owned();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_owned()))
        .collect();

    let len = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .map(|(_, v)| v.parse::<usize>().unwrap())
        .unwrap_or(0);
    let mut body = buf[header_end..].to_vec();
    while body.len() < len {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Captured {
        method,
        target,
        headers,
        body: String::from_utf8(body).unwrap(),
    }
}

/// Serves `responses` in order, one connection each.
async fn stub(responses: Vec<(u16, String)>) -> (ApiClient, mpsc::UnboundedReceiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            let captured = read_request(&mut stream).await;
            let _ = tx.send(captured);
            let response = format!(
                "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
        }
    });

    let config = ApiConfig::with_base_url(format!("http://{addr}/sensorama/api"))
        .timeout(Duration::from_secs(5));
    (ApiClient::new(config).unwrap(), rx)
}

fn ok(data: &str) -> (u16, String) {
    (200, format!(r#"{{"data":{data},"time":"2024-05-01T12:00:00"}}"#))
}

// =========================================================================
// Endpoints
// =========================================================================

#[tokio::test]
async fn test_login_posts_credentials_and_unwraps_envelope() {
    let (client, mut seen) = stub(vec![ok(
        r#"{"token":"a.b.c","user":{"id":7,"username":"ana"}}"#,
    )])
    .await;

    let login = client.login(&Credentials::new("ana", "s3cret")).await.unwrap();

    assert_eq!(login.token, "a.b.c");
    assert_eq!(login.user.unwrap().id, "7");

    let request = seen.recv().await.unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(request.target, "/sensorama/api/public/users/login");
    assert_eq!(request.header("authorization"), None);
    assert_eq!(
        request.json(),
        serde_json::json!({"username": "ana", "password": "s3cret"})
    );
}

#[tokio::test]
async fn test_profile_sends_bearer_token() {
    let (client, mut seen) = stub(vec![ok(r#"{"id":"p1","name":"Ana"}"#)]).await;
    client.set_token("tok-123").await;

    let profile = client.profile("p1").await.unwrap();

    assert_eq!(profile.name.as_deref(), Some("Ana"));
    let request = seen.recv().await.unwrap();
    assert_eq!(request.method, "GET");
    assert_eq!(request.target, "/sensorama/api/profiles/p1");
    assert_eq!(request.header("authorization"), Some("Bearer tok-123"));
}

#[tokio::test]
async fn test_update_profile_puts_only_present_fields() {
    let (client, mut seen) = stub(vec![ok(r#"{"id":"p1","phone":"11987654321"}"#)]).await;
    let update = UpdateProfile {
        phone: Some("11987654321".into()),
        ..Default::default()
    };

    let profile = client.update_profile("p1", &update).await.unwrap();

    assert_eq!(profile.phone.as_deref(), Some("11987654321"));
    let request = seen.recv().await.unwrap();
    assert_eq!(request.method, "PUT");
    assert_eq!(request.json(), serde_json::json!({"phone": "11987654321"}));
}

#[tokio::test]
async fn test_update_profile_name_encodes_query() {
    let (client, mut seen) = stub(vec![ok(r#"{"id":"p1","name":"Ana Maria"}"#)]).await;

    let profile = client.update_profile_name("p1", "Ana Maria").await.unwrap();

    assert_eq!(profile.name.as_deref(), Some("Ana Maria"));
    let request = seen.recv().await.unwrap();
    assert_eq!(request.method, "PATCH");
    assert_eq!(
        request.target,
        "/sensorama/api/profiles/p1/update-name?newName=Ana+Maria"
    );
}

#[tokio::test]
async fn test_register_returns_raw_payload() {
    let (client, mut seen) = stub(vec![ok(r#"{"id":99,"username":"bia"}"#)]).await;
    let registration = RegistrationRequest {
        email: Some("bia@example.com".into()),
        cpf: Some("52998224725".into()),
        ..RegistrationRequest::new("bia", "pw")
    };

    let reply = client.register(&registration).await.unwrap();

    assert_eq!(reply["id"], 99);
    let body = seen.recv().await.unwrap().json();
    assert_eq!(body["cpf"], "52998224725");
    assert!(body.get("phone").is_none());
}

// =========================================================================
// Failures
// =========================================================================

#[tokio::test]
async fn test_error_status_carries_backend_message() {
    let (client, _seen) = stub(vec![(401, r#"{"message":"Bad credentials"}"#.into())]).await;

    let err = client
        .login(&Credentials::new("ana", "wrong"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ApiError::Status { status: 401, ref message } if message == "Bad credentials"
    ));
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_body_without_envelope_returns_decode_error() {
    let (client, _seen) = stub(vec![(200, r#"{"token":"bare"}"#.into())]).await;

    let err = client
        .login(&Credentials::new("ana", "pw"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn test_silent_server_returns_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        loop {
            let (stream, _) = listener.accept().await.unwrap();
            held.push(stream);
        }
    });
    let config = ApiConfig::with_base_url(format!("http://{addr}/api"))
        .timeout(Duration::from_millis(200));
    let client = ApiClient::new(config).unwrap();

    let err = client.profile("p1").await.unwrap_err();

    assert!(matches!(err, ApiError::Timeout), "got {err:?}");
}

#[tokio::test]
async fn test_refused_connection_returns_network_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let client = ApiClient::new(ApiConfig::with_base_url(format!("http://{addr}/api"))).unwrap();

    let err = client.profile("p1").await.unwrap_err();

    assert!(matches!(err, ApiError::Network(_)), "got {err:?}");
}
