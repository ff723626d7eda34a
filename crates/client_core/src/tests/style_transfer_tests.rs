use super::*;
use axum::{http::StatusCode, routing::post, Json, Router};
use std::sync::Arc;
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

async fn spawn_server(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn posts_image_and_style_and_returns_stylized_url() {
    let (tx, rx) = oneshot::channel::<serde_json::Value>();
    let tx = Arc::new(Mutex::new(Some(tx)));
    let app = Router::new().route(
        "/style-transfer",
        post(move |Json(body): Json<serde_json::Value>| {
            let tx = Arc::clone(&tx);
            async move {
                if let Some(tx) = tx.lock().await.take() {
                    let _ = tx.send(body);
                }
                Json(serde_json::json!({ "stylizedImageUrl": "https://cdn/x.png" }))
            }
        }),
    );
    let server_url = spawn_server(app).await;

    let adapter = HttpStyleTransfer::new(&format!("{server_url}/"), None);
    let output = adapter
        .transfer(&ImageRef::remote("https://cdn/in.png"), StyleName::PixelArt)
        .await
        .expect("transfer");

    assert_eq!(output, ImageRef::remote("https://cdn/x.png"));
    let body = rx.await.expect("request body");
    assert_eq!(
        body,
        serde_json::json!({ "imageUrl": "https://cdn/in.png", "style": "Pixel Art" })
    );
}

#[tokio::test]
async fn server_error_maps_to_status() {
    let app = Router::new().route(
        "/style-transfer",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let server_url = spawn_server(app).await;

    let err = HttpStyleTransfer::new(&server_url, None)
        .transfer(&ImageRef::remote("https://cdn/in.png"), StyleName::VanGogh)
        .await
        .expect_err("must fail");
    assert_eq!(err, TransferError::Status { status: 500 });
}

#[tokio::test]
async fn unexpected_shape_maps_to_malformed() {
    let app = Router::new().route(
        "/style-transfer",
        post(|| async { Json(serde_json::json!({ "url": "https://cdn/x.png" })) }),
    );
    let server_url = spawn_server(app).await;

    let err = HttpStyleTransfer::new(&server_url, None)
        .transfer(&ImageRef::remote("https://cdn/in.png"), StyleName::VanGogh)
        .await
        .expect_err("must fail");
    assert!(matches!(err, TransferError::Malformed(_)), "got {err:?}");
}

#[tokio::test]
async fn empty_stylized_url_maps_to_malformed() {
    let app = Router::new().route(
        "/style-transfer",
        post(|| async { Json(serde_json::json!({ "stylizedImageUrl": "" })) }),
    );
    let server_url = spawn_server(app).await;

    let err = HttpStyleTransfer::new(&server_url, None)
        .transfer(&ImageRef::remote("https://cdn/in.png"), StyleName::Cyberpunk)
        .await
        .expect_err("must fail");
    assert!(matches!(err, TransferError::Malformed(_)), "got {err:?}");
}

#[tokio::test]
async fn slow_service_maps_to_timeout() {
    let app = Router::new().route(
        "/style-transfer",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(serde_json::json!({ "stylizedImageUrl": "https://cdn/late.png" }))
        }),
    );
    let server_url = spawn_server(app).await;

    let err = HttpStyleTransfer::new(&server_url, Some(Duration::from_millis(100)))
        .transfer(&ImageRef::remote("https://cdn/in.png"), StyleName::VanGogh)
        .await
        .expect_err("must time out");
    assert_eq!(err, TransferError::Timeout);
}

#[tokio::test]
async fn unreachable_service_maps_to_network() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = HttpStyleTransfer::new(&format!("http://{addr}"), None)
        .transfer(&ImageRef::remote("https://cdn/in.png"), StyleName::VanGogh)
        .await
        .expect_err("must fail");
    assert!(matches!(err, TransferError::Network(_)), "got {err:?}");
}

#[test]
fn endpoint_tolerates_trailing_slash() {
    let adapter = HttpStyleTransfer::new("https://svc.example/", None);
    assert_eq!(adapter.endpoint, "https://svc.example/style-transfer");
}
