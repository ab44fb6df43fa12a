mod common;

use axum::http::StatusCode;
use chrono::Local;
use common::{TestApp, OTHER_OWNER, OWNER};
use invoice_service::config::InvoiceConfig;
use invoice_service::services::numbering::format_base;
use invoice_service::Application;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use uuid::Uuid;

/// Decimals serialize as strings; accept numbers too.
fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        Value::Number(n) => n.to_string().parse().unwrap(),
        other => panic!("not a decimal: {other}"),
    }
}

fn save_body(company_id: Uuid, number: &str, unit_price: i64) -> Value {
    json!({
        "companyId": company_id,
        "totalAmount": 2 * unit_price.max(0),
        "invoice": {
            "number": number,
            "type": "DEFINITIVE",
            "clientName": "Client SA",
            "clientAddress": "12 rue du Port",
            "amountPaid": 500,
            "items": [
                { "designation": "Ciment", "quantity": 2, "unit": "sac", "unitPrice": unit_price }
            ]
        }
    })
}

fn todays_number(sequence: i64) -> String {
    format_base(sequence, Local::now().date_naive())
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = TestApp::spawn().await;

    let (status, body) = app.request("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, _) = app.request("GET", "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn application_binds_on_the_memory_backend() {
    let mut config = InvoiceConfig::in_memory();
    config.common.port = 0;

    let application = Application::build(config).await.unwrap();
    assert_ne!(application.port(), 0);
}

#[tokio::test]
async fn next_number_previews_without_reserving() {
    let app = TestApp::spawn().await;
    let uri = format!(
        "/invoices/next-number?date=2025-01-15&companyId={}&type=DEFINITIVE",
        app.company.company_id
    );

    for _ in 0..2 {
        let (status, body) = app.request("GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scope"], "2501");
        assert_eq!(body["sequence"], 1);
        assert_eq!(body["baseNumber"], "FAC-2501-0001");
        assert_eq!(body["displayNumber"], "MLFDEF-2501-0001");
        assert_eq!(body["provisional"], true);
    }
}

#[tokio::test]
async fn next_number_for_unknown_company_is_bad_request() {
    let app = TestApp::spawn().await;
    let uri = format!("/invoices/next-number?companyId={}", Uuid::new_v4());

    let (status, _) = app.request("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn save_creates_then_updates() {
    let app = TestApp::spawn().await;
    let company_id = app.company.company_id;

    let (status, created) = app
        .request("POST", "/invoices", Some(OWNER), Some(save_body(company_id, "", 1200)))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["outcome"], "created");
    assert_eq!(created["number"], todays_number(1));
    assert_eq!(created["numberChanged"], false);
    assert!(created.get("submittedNumber").is_none());

    let number = created["number"].as_str().unwrap().to_string();
    let (status, updated) = app
        .request("POST", "/invoices", Some(OWNER), Some(save_body(company_id, &number, 1000)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["outcome"], "updated");
    assert_eq!(updated["invoiceId"], created["invoiceId"]);

    let uri = format!("/invoices/{}", created["invoiceId"].as_str().unwrap());
    let (status, invoice) = app.request("GET", &uri, Some(OWNER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invoice["number"], number);
    assert_eq!(invoice["type"], "DEFINITIVE");
    assert_eq!(decimal(&invoice["items"][0]["unitPrice"]), Decimal::from(1000));
    assert_eq!(decimal(&invoice["items"][0]["totalPrice"]), Decimal::from(2000));
}

#[tokio::test]
async fn save_reports_a_changed_number() {
    let app = TestApp::spawn().await;
    let company_id = app.company.company_id;
    let provisional = todays_number(1);

    let (_, first) = app
        .request(
            "POST",
            "/invoices",
            Some(OWNER),
            Some(save_body(company_id, &provisional, 1200)),
        )
        .await;
    assert_eq!(first["numberChanged"], false);

    let (status, second) = app
        .request(
            "POST",
            "/invoices",
            Some(OTHER_OWNER),
            Some(save_body(company_id, &provisional, 1200)),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["outcome"], "renumbered");
    assert_eq!(second["numberChanged"], true);
    assert_eq!(second["number"], todays_number(2));
    assert_eq!(second["submittedNumber"], provisional);
}

#[tokio::test]
async fn save_rejects_invalid_drafts() {
    let app = TestApp::spawn().await;
    let company_id = app.company.company_id;

    let (status, body) = app
        .request("POST", "/invoices", Some(OWNER), Some(save_body(company_id, "", -5)))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("items[0].unitPrice"));

    let mut blank_client = save_body(company_id, "", 1200);
    blank_client["invoice"]["clientName"] = json!("");
    let (status, _) = app
        .request("POST", "/invoices", Some(OWNER), Some(blank_client))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .request(
            "POST",
            "/invoices",
            Some(OWNER),
            Some(save_body(Uuid::new_v4(), "", 1200)),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, preview) = app
        .request("GET", "/invoices/next-number", None, None)
        .await;
    assert_eq!(preview["sequence"], 1);
}

#[tokio::test]
async fn save_rejects_prices_with_sub_cent_precision() {
    let app = TestApp::spawn().await;

    let mut body = save_body(app.company.company_id, "", 1200);
    body["invoice"]["items"][0]["unitPrice"] = json!("1200.555");
    body["invoice"]["items"][0]["quantity"] = json!(1);
    body["totalAmount"] = json!("1200.56");

    let (status, error) = app.request("POST", "/invoices", Some(OWNER), Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(error["details"]
        .as_str()
        .unwrap()
        .contains("items[0].unitPrice"));
    assert_eq!(app.store.invoice_count().await, 0);
}

#[tokio::test]
async fn requests_without_owner_are_unauthorized() {
    let app = TestApp::spawn().await;

    let (status, _) = app.request("GET", "/invoices", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(
            "POST",
            "/invoices",
            None,
            Some(save_body(app.company.company_id, "", 1200)),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn list_is_paged_newest_first() {
    let app = TestApp::spawn().await;
    let company_id = app.company.company_id;

    for _ in 0..3 {
        let (status, _) = app
            .request("POST", "/invoices", Some(OWNER), Some(save_body(company_id, "", 1200)))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    app.request(
        "POST",
        "/invoices",
        Some(OTHER_OWNER),
        Some(save_body(company_id, "", 1200)),
    )
    .await;

    let (status, first) = app
        .request("GET", "/invoices?page=1&pageSize=2", Some(OWNER), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["total"], 3);
    assert_eq!(first["totalPages"], 2);
    assert_eq!(first["invoices"].as_array().unwrap().len(), 2);
    assert_eq!(first["invoices"][0]["number"], todays_number(3));
    assert_eq!(first["invoices"][1]["number"], todays_number(2));

    let (_, second) = app
        .request("GET", "/invoices?page=2&pageSize=2", Some(OWNER), None)
        .await;
    assert_eq!(second["invoices"].as_array().unwrap().len(), 1);
    assert_eq!(second["invoices"][0]["number"], todays_number(1));
}

#[tokio::test]
async fn document_applies_company_markup_and_branding() {
    let app = TestApp::spawn().await;

    let (_, created) = app
        .request(
            "POST",
            "/invoices",
            Some(OWNER),
            Some(save_body(app.company.company_id, "", 1200)),
        )
        .await;
    let uri = format!(
        "/invoices/{}/document",
        created["invoiceId"].as_str().unwrap()
    );

    let (status, document) = app.request("GET", &uri, Some(OWNER), None).await;
    assert_eq!(status, StatusCode::OK);

    let base = todays_number(1);
    let branded = base.replacen("FAC-", "MLFDEF-", 1);
    assert_eq!(document["number"], base);
    assert_eq!(document["displayNumber"], branded);
    assert_eq!(document["companyName"], "ETS MLF");
    assert_eq!(document["templateId"], "classic");

    // 1200 marked up by 10% is 1320, which rounds to 1500.
    let line = &document["lines"][0];
    assert_eq!(decimal(&line["unitPrice"]), Decimal::from(1500));
    assert_eq!(decimal(&line["totalPrice"]), Decimal::from(3000));
    assert_eq!(decimal(&document["total"]), Decimal::from(3000));
    assert_eq!(decimal(&document["balanceDue"]), Decimal::from(2500));
}

#[tokio::test]
async fn delete_removes_only_owned_invoices() {
    let app = TestApp::spawn().await;

    let (_, created) = app
        .request(
            "POST",
            "/invoices",
            Some(OWNER),
            Some(save_body(app.company.company_id, "", 1200)),
        )
        .await;
    let uri = format!("/invoices/{}", created["invoiceId"].as_str().unwrap());

    let (status, _) = app.request("DELETE", &uri, Some(OTHER_OWNER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.request("DELETE", &uri, Some(OWNER), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.request("DELETE", &uri, Some(OWNER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.request("GET", &uri, Some(OWNER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleted_numbers_are_not_reissued() {
    let app = TestApp::spawn().await;
    let company_id = app.company.company_id;

    let (_, created) = app
        .request("POST", "/invoices", Some(OWNER), Some(save_body(company_id, "", 1200)))
        .await;
    let uri = format!("/invoices/{}", created["invoiceId"].as_str().unwrap());
    app.request("DELETE", &uri, Some(OWNER), None).await;

    let (_, next) = app
        .request("POST", "/invoices", Some(OWNER), Some(save_body(company_id, "", 1200)))
        .await;
    assert_eq!(next["number"], todays_number(2));
}
