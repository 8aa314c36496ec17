mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn court_validation_reports_each_field() -> Result<()> {
    let server = common::start_server().await?;
    let token = server.register(&common::unique_email("owner")).await?;

    let (status, body) = server
        .call(Method::POST, "/api/courts", &token, Some(json!({
            "name": "Quadra 1",
            "zipCode": "123",
            "phone": "999",
            "pricePerHour": -1
        })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    for field in ["address", "city", "state", "zipCode", "phone", "pricePerHour"] {
        assert!(body["field_errors"][field].is_string(), "missing error for {}", field);
    }

    let (status, body) = server
        .call(Method::POST, "/api/courts", &token, Some(json!({
            "name": "Quadra 1",
            "address": "Av. Paulista, 1000",
            "city": "São Paulo",
            "state": "SP",
            "zipCode": "01310-100",
            "phone": "(11) 91234-5678",
            "pricePerHour": "80.00"
        })))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["zipCode"], "01310-100");
    Ok(())
}

#[tokio::test]
async fn summary_aggregates_the_callers_data() -> Result<()> {
    let server = common::start_server().await?;
    let token = server.register(&common::unique_email("owner")).await?;

    let (_, body) = server
        .call(Method::POST, "/api/clients", &token, Some(json!({ "name": "Carlos" })))
        .await?;
    let client_id = body["data"]["id"].as_i64().unwrap_or_default();

    for (day, amount) in [("2025-05-01", "100"), ("2025-06-01", "40")] {
        let (status, _) = server
            .call(Method::POST, "/api/receipts", &token, Some(json!({
                "client": client_id,
                "amount": amount,
                "currency": "BRL",
                "receivedDate": day
            })))
            .await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = server.call(Method::GET, "/api/reports/summary", &token, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["clients"]["total"], 1);
    assert_eq!(body["data"]["receipts"]["count"], 2);
    assert_eq!(body["data"]["receipts"]["totals"]["BRL"], "140.00");

    let (status, body) = server
        .call(Method::GET, "/api/reports/summary?from=2025-06-01&to=2025-06-30", &token, None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["receipts"]["count"], 1);

    let (status, _) = server
        .call(Method::GET, "/api/reports/summary?from=June", &token, None)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}
