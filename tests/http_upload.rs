//! End-to-end tests for the upload endpoint.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`; no
//! socket is bound.

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use image::{ImageEncoder, Rgb, RgbImage};
use squarefit::config::Config;
use squarefit::imaging::OutputFormat;
use squarefit::server::Server;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "squarefit-test-boundary";

fn jpeg(img: &RgbImage) -> Vec<u8> {
    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, 95)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
    out
}

fn png(img: &RgbImage) -> Vec<u8> {
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
    out
}

/// Build a multipart body with a single part.
fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn test_config(public: &TempDir) -> Config {
    let mut config = Config::default();
    config.server.public_dir = public.path().to_path_buf();
    config
}

async fn send(config: Config, request: Request<Body>) -> Response {
    Server::new(config).router().oneshot(request).await.unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

fn header_str<'a>(response: &'a Response, name: header::HeaderName) -> &'a str {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn landscape_jpeg_is_letterboxed_to_its_short_edge() {
    let public = TempDir::new().unwrap();
    let source = RgbImage::from_pixel(1920, 1080, Rgb([230, 230, 230]));
    let body = multipart_body("file", "holiday.jpg", "image/jpeg", &jpeg(&source));

    let response = send(test_config(&public), upload_request(body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CONTENT_TYPE), "image/jpeg");
    assert_eq!(
        header_str(&response, header::CONTENT_DISPOSITION),
        "attachment; filename=\"holiday-resize.jpg\""
    );
    let length: usize = header_str(&response, header::CONTENT_LENGTH)
        .parse()
        .unwrap();

    let bytes = body_bytes(response).await;
    assert_eq!(bytes.len(), length);

    let out = image::load_from_memory(&bytes).unwrap().to_rgb8();
    assert_eq!(out.dimensions(), (1080, 1080));
    // Photo fitted to 1080x608 at y = 236; black above and below
    let top = out.get_pixel(540, 10);
    let middle = out.get_pixel(540, 540);
    let bottom = out.get_pixel(540, 1070);
    assert!(top.0.iter().all(|&c| c < 16), "top bar not black: {top:?}");
    assert!(bottom.0.iter().all(|&c| c < 16), "bottom bar not black: {bottom:?}");
    assert!(middle.0.iter().all(|&c| c > 200), "photo missing: {middle:?}");
}

#[tokio::test]
async fn square_png_keeps_its_size() {
    let public = TempDir::new().unwrap();
    let source = RgbImage::from_fn(300, 300, |x, y| Rgb([x as u8, y as u8, 90]));
    let body = multipart_body("file", "avatar.png", "image/png", &png(&source));

    let response = send(test_config(&public), upload_request(body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CONTENT_TYPE), "image/jpeg");
    let out = image::load_from_memory(&body_bytes(response).await).unwrap();
    assert_eq!((out.width(), out.height()), (300, 300));
}

#[tokio::test]
async fn preserve_policy_returns_identical_png() {
    let public = TempDir::new().unwrap();
    let mut config = test_config(&public);
    config.imaging.output = OutputFormat::Preserve;
    let source = RgbImage::from_fn(300, 300, |x, y| Rgb([x as u8, y as u8, 90]));
    let body = multipart_body("file", "avatar.png", "image/png", &png(&source));

    let response = send(config, upload_request(body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CONTENT_TYPE), "image/png");
    assert_eq!(
        header_str(&response, header::CONTENT_DISPOSITION),
        "attachment; filename=\"avatar-resize.png\""
    );
    let out = image::load_from_memory(&body_bytes(response).await)
        .unwrap()
        .to_rgb8();
    assert_eq!(out, source);
}

#[tokio::test]
async fn jpg_alias_is_accepted() {
    let public = TempDir::new().unwrap();
    let source = RgbImage::from_pixel(40, 20, Rgb([10, 200, 10]));
    let body = multipart_body("file", "a.jpg", "image/jpg", &jpeg(&source));

    let response = send(test_config(&public), upload_request(body)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn text_upload_is_unsupported_media_type() {
    let public = TempDir::new().unwrap();
    let body = multipart_body("file", "notes.txt", "text/plain", b"hello");

    let response = send(test_config(&public), upload_request(body)).await;

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.contains("text/plain"), "unexpected body: {text}");
}

#[tokio::test]
async fn missing_file_field_is_bad_request() {
    let public = TempDir::new().unwrap();
    let source = RgbImage::from_pixel(8, 8, Rgb([1, 2, 3]));
    let body = multipart_body("photo", "a.png", "image/png", &png(&source));

    let response = send(test_config(&public), upload_request(body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(text, "Missing form field \"file\"");
}

#[tokio::test]
async fn corrupt_image_is_unprocessable() {
    let public = TempDir::new().unwrap();
    let body = multipart_body("file", "broken.png", "image/png", b"\x89PNG\r\n\x1a\ntruncated");

    let response = send(test_config(&public), upload_request(body)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn non_multipart_body_is_rejected() {
    let public = TempDir::new().unwrap();
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = send(test_config(&public), request).await;
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let public = TempDir::new().unwrap();
    let mut config = test_config(&public);
    config.server.max_upload_bytes = 1024;
    let source = RgbImage::from_fn(200, 200, |x, y| Rgb([x as u8, y as u8, (x ^ y) as u8]));
    let body = multipart_body("file", "big.png", "image/png", &png(&source));
    assert!(body.len() > 1024);

    let response = send(config, upload_request(body)).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn get_upload_redirects_home() {
    let public = TempDir::new().unwrap();
    let request = Request::builder()
        .method("GET")
        .uri("/upload")
        .body(Body::empty())
        .unwrap();

    let response = send(test_config(&public), request).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(header_str(&response, header::LOCATION), "/");
}

#[tokio::test]
async fn other_paths_serve_public_files() {
    let public = TempDir::new().unwrap();
    std::fs::write(public.path().join("index.html"), "<h1>upload</h1>").unwrap();
    let request = Request::builder()
        .method("GET")
        .uri("/")
        .body(Body::empty())
        .unwrap();

    let response = send(test_config(&public), request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"<h1>upload</h1>");
}
