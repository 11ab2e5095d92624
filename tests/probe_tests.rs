//! Classification of real `reqwest` failures.
//!
//! Each test points the probe client at a local socket that misbehaves in a
//! specific way and checks the category the classifier assigns.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use whatnet::connectivity::{ProbeClient, ReqwestProbeClient};
use whatnet::error::{classify, is_connection_error, BasicErrorType};

/// Client that ignores any proxy settings in the environment.
fn client() -> ReqwestProbeClient {
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("Failed to create client");
    ReqwestProbeClient::with_client(client)
}

/// Returns the address of a local port with nothing listening on it.
async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}

/// Serves one connection: reads the request head, writes `reply`, then closes.
async fn serve_once(reply: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(reply).await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{}/", addr)
}

/// Reads the request head, then aborts the connection with a TCP reset.
async fn reset_after_request() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            #[allow(deprecated)]
            let _ = socket.set_linger(Some(Duration::ZERO));
            drop(socket);
        }
    });
    format!("http://{}/", addr)
}

/// Accepts connections and never answers them.
async fn silent_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}/", addr)
}

#[tokio::test]
async fn test_any_response_is_success() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(client().head(&server.uri()).await.is_ok());
}

#[tokio::test]
async fn test_refused_connection_is_cant_connect() {
    let url = closed_port_url().await;
    let err = client().head(&url).await.unwrap_err();

    assert!(is_connection_error(&*err));
    assert_eq!(classify(err).category(), BasicErrorType::CantConnectToHost);
}

#[tokio::test]
async fn test_unresolvable_host_is_cant_resolve() {
    let err = client()
        .head("http://whatnet-probe.invalid/")
        .await
        .unwrap_err();

    assert_eq!(classify(err).category(), BasicErrorType::CantResolveHost);
}

#[tokio::test]
async fn test_closed_before_response_is_unexpected_eof() {
    let url = serve_once(b"").await;
    let err = client().head(&url).await.unwrap_err();

    assert!(!is_connection_error(&*err));
    assert_eq!(classify(err).category(), BasicErrorType::UnexpectedEof);
}

#[tokio::test]
async fn test_non_http_reply_is_bad_data() {
    let url = serve_once(b"SSH-2.0-OpenSSH_9.6\r\n\r\n").await;
    let err = client().head(&url).await.unwrap_err();

    let basic = classify(err);
    assert_eq!(basic.category(), BasicErrorType::BadDataReceived);
    assert!(basic.cause().downcast_ref::<reqwest::Error>().is_some());
}

#[tokio::test]
async fn test_reset_after_request_is_unexpected_eof() {
    let url = reset_after_request().await;
    let err = client().head(&url).await.unwrap_err();

    assert!(!is_connection_error(&*err));
    assert_eq!(classify(err).category(), BasicErrorType::UnexpectedEof);
}

#[tokio::test]
async fn test_tls_against_plain_http_is_cant_find_host() {
    let server = MockServer::start().await;
    let url = server.uri().replacen("http://", "https://", 1);
    let err = client().head(&url).await.unwrap_err();

    assert!(is_connection_error(&*err));
    assert_eq!(classify(err).category(), BasicErrorType::CantFindHost);
}

#[tokio::test]
async fn test_timed_out_probe_is_cant_connect() {
    let url = silent_server().await;
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(1))
        .build()
        .expect("Failed to create client");
    let err = ReqwestProbeClient::with_client(client)
        .head(&url)
        .await
        .unwrap_err();

    assert!(is_connection_error(&*err));
    assert_eq!(classify(err).category(), BasicErrorType::CantConnectToHost);
}
