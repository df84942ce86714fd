use std::net::SocketAddr;

use fway::{Request, Router, Server};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

async fn start(router: Router) -> (SocketAddr, oneshot::Sender<()>, JoinHandle<Result<(), fway::Error>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        Server::from_listener(listener)
            .serve_with_shutdown(router, async {
                let _ = rx.await;
            })
            .await
    });
    (addr, tx, handle)
}

/// Sends one HTTP/1.1 request with `Connection: close` and returns the raw response.
async fn roundtrip(addr: SocketAddr, head: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(format!("{head}\r\nHost: localhost\r\nConnection: close\r\n\r\n").as_bytes())
        .await
        .unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    String::from_utf8(raw).unwrap()
}

#[tokio::test]
async fn serves_routes_over_tcp() {
    init_tracing();

    let router = Router::new()
        .get("/users/:id", |req: Request| async move {
            format!("user {}", req.param("id").unwrap())
        })
        .put("/users/:id", |_req: Request| async { "updated" });
    let (addr, shutdown, handle) = start(router).await;

    let ok = roundtrip(addr, "GET /users/42 HTTP/1.1").await;
    assert!(ok.starts_with("HTTP/1.1 200 OK\r\n"), "{ok}");
    assert!(ok.ends_with("\r\n\r\nuser 42"), "{ok}");

    let missing = roundtrip(addr, "GET /users HTTP/1.1").await;
    assert!(missing.starts_with("HTTP/1.1 404 Not Found\r\n"), "{missing}");
    assert!(missing.contains("content-type: text/plain\r\n"), "{missing}");
    assert!(missing.ends_with("404 - NOT FOUND"), "{missing}");

    let options = roundtrip(addr, "OPTIONS /users/42 HTTP/1.1").await;
    assert!(options.starts_with("HTTP/1.1 204 No Content\r\n"), "{options}");
    assert!(options.contains("access-control-allow-methods: GET, PUT\r\n"), "{options}");

    shutdown.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn invalid_bind_address_is_an_error() {
    init_tracing();

    let err = Server::bind("not an address")
        .serve_with_shutdown(Router::new(), async {})
        .await
        .unwrap_err();

    assert!(matches!(err, fway::Error::Addr { .. }), "{err}");
}
