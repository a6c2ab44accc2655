//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use lb_gateway::config::GatewayConfig;
use lb_gateway::load_balancer::{Balancer, BackendRegistry};
use lb_gateway::{HttpServer, Shutdown};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// Raw HTTP/1.1 response with `Content-Length` and `Connection: close`.
pub fn http_response(status: &str, extra_headers: &[(&str, &str)], body: &[u8]) -> Vec<u8> {
    let mut head = format!("HTTP/1.1 {}\r\nContent-Length: {}\r\n", status, body.len());
    for (name, value) in extra_headers {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str("Connection: close\r\n\r\n");

    let mut response = head.into_bytes();
    response.extend_from_slice(body);
    response
}

/// Read the request line and headers as sent.
async fn read_head(stream: &mut TcpStream) -> String {
    let mut reader = BufReader::new(stream);
    let mut head = String::new();
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                if line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
        }
    }
    head
}

/// Start a backend that answers every request with `respond(request_head)`.
pub async fn start_programmable_backend<F>(respond: F) -> SocketAddr
where
    F: Fn(&str) -> Vec<u8> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let respond = Arc::new(respond);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let respond = respond.clone();
            tokio::spawn(async move {
                let head = read_head(&mut socket).await;
                let _ = socket.write_all(&respond(&head)).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Start a backend that returns a fixed 200 body.
pub async fn start_mock_backend(body: &'static str) -> SocketAddr {
    start_programmable_backend(move |_| http_response("200 OK", &[], body.as_bytes())).await
}

/// Start a backend that serves `{"load": <load>}` on `/load` and `body`
/// everywhere else.
pub async fn start_load_reporting_backend(load: f64, body: &'static str) -> SocketAddr {
    start_programmable_backend(move |head| {
        if head.starts_with("GET /load ") {
            let json = format!(r#"{{"load": {}}}"#, load);
            http_response("200 OK", &[("Content-Type", "application/json")], json.as_bytes())
        } else {
            http_response("200 OK", &[], body.as_bytes())
        }
    })
    .await
}

/// Start a backend that accepts connections and never answers.
pub async fn start_black_hole() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

/// Start a backend that sends a response head promising `Content-Length:
/// 100`, then only `ab`, then holds the socket open.
pub async fn start_stalling_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((mut socket, _)) = listener.accept().await {
            read_head(&mut socket).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nab")
                .await;
            held.push(socket);
        }
    });

    addr
}

/// An address nothing listens on.
pub fn refused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Comma-separated backend list for `addrs`.
pub fn servers(addrs: &[SocketAddr]) -> String {
    addrs.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}

/// A running gateway.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub balancer: Arc<Balancer>,
    pub shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a gateway for `servers` on an ephemeral port.
pub async fn start_gateway(config: GatewayConfig, servers: &str) -> TestGateway {
    let registry = BackendRegistry::parse(servers).unwrap();
    let server = HttpServer::new(&config, registry).unwrap();
    let balancer = server.balancer().clone();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, stop).await;
    });

    TestGateway {
        addr,
        balancer,
        shutdown,
    }
}

/// Client that neither follows redirects nor uses system proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
