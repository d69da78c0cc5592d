//! End-to-end tests for the HTTP surface.
//!
//! Each test drives the full router with an in-memory SQLite store and a
//! stand-in model client that counts its calls.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde_json::Value;
use tower::ServiceExt;

use docfields_core::error::{DocfieldsError, DocfieldsResult};
use docfields_core::traits::{ModelClient, ModelRequest, ModelResponse, RecordStore};
use docfields_core::types::{ExtractedFields, ExtractedRecord};
use docfields_core::ExtractionService;
use docfields_server::{create_server, AppState};
use docfields_store::SqliteRecordStore;

const BOUNDARY: &str = "docfields-test-boundary";
const MAX_UPLOAD: usize = 1024 * 1024;

/// Model stand-in returning a fixed reply.
struct StubModel {
    reply: String,
    calls: AtomicUsize,
}

impl StubModel {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelClient for StubModel {
    async fn generate(&self, _request: &ModelRequest) -> DocfieldsResult<ModelResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ModelResponse::new(self.reply.clone()))
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

/// Store whose every call fails.
struct UnreachableStore;

#[async_trait]
impl RecordStore for UnreachableStore {
    async fn insert(&self, _fields: &ExtractedFields) -> DocfieldsResult<ExtractedRecord> {
        Err(DocfieldsError::db_connection("connection refused"))
    }

    async fn get(&self, _id: i64) -> DocfieldsResult<Option<ExtractedRecord>> {
        Err(DocfieldsError::db_connection("connection refused"))
    }

    async fn count(&self) -> DocfieldsResult<u64> {
        Err(DocfieldsError::db_connection("connection refused"))
    }

    async fn ping(&self) -> DocfieldsResult<i32> {
        Err(DocfieldsError::db_connection("connection refused"))
    }

    fn backend_name(&self) -> &str {
        "unreachable"
    }
}

struct Harness {
    app: Router,
    model: Arc<StubModel>,
    store: Arc<SqliteRecordStore>,
}

fn harness_with_limit(reply: &str, max_upload: usize) -> Harness {
    let model = StubModel::replying(reply);
    let store = Arc::new(SqliteRecordStore::in_memory().unwrap());
    let service = ExtractionService::new(model.clone(), store.clone());
    let app = create_server(AppState::new(service, max_upload));
    Harness { app, model, store }
}

fn harness(reply: &str) -> Harness {
    harness_with_limit(reply, MAX_UPLOAD)
}

fn multipart_body(field: &str, content_type: Option<&str>, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"upload\"\r\n",
            BOUNDARY, field
        )
        .as_bytes(),
    );
    if let Some(content_type) = content_type {
        body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload(field: &str, content_type: Option<&str>, data: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/extract-data")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(field, content_type, data)))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn pdf_with_pages(lines: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for line in lines {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        kids.push(
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            })
            .into(),
        );
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn jpeg_bytes() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([200, 10, 10])));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .unwrap();
    bytes
}

#[tokio::test]
async fn test_health_probe() {
    let h = harness("{}");
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let (status, body) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Database connection OK");
    assert_eq!(body["result"]["number"], 1);
}

#[tokio::test]
async fn test_health_probe_failure_is_generic() {
    let service = ExtractionService::new(StubModel::replying("{}"), Arc::new(UnreachableStore));
    let app = create_server(AppState::new(service, MAX_UPLOAD));
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
}

#[tokio::test]
async fn test_pdf_scenario_returns_fields_and_persists_row() {
    let reply = r#"{"CNPJ":"","CEP":"","Data de emissão":"","Valor total":"R$ 150,00"}"#;
    let h = harness(reply);
    let pdf = pdf_with_pages(&["Total R$ 150,00"]);

    let (status, body) = send(&h.app, upload("file", Some("application/pdf"), &pdf)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::from_str::<Value>(reply).unwrap());
    assert_eq!(h.model.calls(), 1);
    assert_eq!(h.store.count().await.unwrap(), 1);

    let row = h.store.get(1).await.unwrap().unwrap();
    assert_eq!(row.fields.total_value, "R$ 150,00");
    assert_eq!(row.fields.cnpj, "");
    assert_eq!(row.fields.cep, "");
    assert_eq!(row.fields.issue_date, "");
}

#[tokio::test]
async fn test_jpeg_upload_with_fenced_reply() {
    let h = harness("```json\n{\"CNPJ\": \"12.345.678/0001-90\"}\n```");

    let (status, body) = send(&h.app, upload("file", Some("image/jpeg"), &jpeg_bytes())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["CNPJ"], "12.345.678/0001-90");
    assert_eq!(body["Valor total"], "");
    assert_eq!(h.store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_unsupported_media_type() {
    let h = harness("{}");

    let (status, body) = send(&h.app, upload("file", Some("image/gif"), b"GIF89a")).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["error"]["code"], "UNSUPPORTED_MEDIA_TYPE");
    assert_eq!(h.model.calls(), 0);
    assert_eq!(h.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_part_without_content_type_is_unsupported() {
    let h = harness("{}");

    let (status, _) = send(&h.app, upload("file", None, b"%PDF-1.5")).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_empty_upload() {
    let h = harness("{}");

    for content_type in ["image/jpeg", "image/png", "application/pdf"] {
        let (status, body) = send(&h.app, upload("file", Some(content_type), b"")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", content_type);
        assert_eq!(body["error"]["code"], "EMPTY_PAYLOAD");
    }
    assert_eq!(h.model.calls(), 0);
}

#[tokio::test]
async fn test_missing_file_field() {
    let h = harness("{}");

    let (status, body) = send(&h.app, upload("document", Some("application/pdf"), b"%PDF")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_zero_page_pdf_skips_model() {
    let h = harness("{}");

    let (status, body) = send(
        &h.app,
        upload("file", Some("application/pdf"), &pdf_with_pages(&[])),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "UNEXTRACTABLE_CONTENT");
    assert_eq!(h.model.calls(), 0);
}

#[tokio::test]
async fn test_invalid_image() {
    let h = harness("{}");

    let (status, body) = send(&h.app, upload("file", Some("image/png"), b"not an image")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "INVALID_IMAGE");
    assert_eq!(h.model.calls(), 0);
}

#[tokio::test]
async fn test_malformed_reply_persists_nothing() {
    let h = harness("not json");

    let (status, body) = send(&h.app, upload("file", Some("image/jpeg"), &jpeg_bytes())).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "RESPONSE_FORMAT_ERROR");
    assert!(!body.to_string().contains("not json"));
    assert_eq!(h.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_persistence_failure_leaves_no_row() {
    let h = harness(r#"{"CNPJ": "12.345.678/0001-90 and some trailing text"}"#);

    let (status, body) = send(&h.app, upload("file", Some("image/jpeg"), &jpeg_bytes())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "PERSISTENCE_ERROR");
    assert_eq!(h.model.calls(), 1);
    assert_eq!(h.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let h = harness_with_limit("{}", 1024);

    let (status, _) = send(&h.app, upload("file", Some("application/pdf"), &[b'x'; 4096])).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(h.model.calls(), 0);
}
