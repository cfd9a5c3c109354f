#![allow(clippy::unwrap_used)]

use crate::{
    core::{leaflet, order, types::Role},
    errors::Result,
    test_utils::*,
};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value, Vec<String>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookies = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body, cookies)
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_login_sets_cookies_and_me_reads_cookie() -> Result<()> {
    let app = setup_test_app().await?;
    create_test_user(&app.state.db, "anna", Role::Manager).await?;

    let (status, body, cookies) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            &json!({"username": "anna", "password": TEST_PASSWORD}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "manager");
    assert!(cookies.iter().any(|c| c.starts_with("access_token=")));
    assert!(cookies.iter().any(|c| c.starts_with("user_data=")));

    let access_token = body["accessToken"].as_str().unwrap();
    let request = Request::builder()
        .uri("/api/v1/auth/me")
        .header(header::COOKIE, format!("access_token={access_token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "anna");

    Ok(())
}

#[tokio::test]
async fn test_bad_credentials_and_missing_token() -> Result<()> {
    let app = setup_test_app().await?;
    create_test_user(&app.state.db, "anna", Role::Manager).await?;

    let (status, body, _) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            &json!({"username": "anna", "password": "wrong-password"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Неверный логин или пароль");

    let request = Request::builder()
        .uri("/api/v1/leaflets")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_refresh_and_logout() -> Result<()> {
    let app = setup_test_app().await?;
    create_test_user(&app.state.db, "anna", Role::Advertising).await?;

    let (_, body, _) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            &json!({"username": "anna", "password": TEST_PASSWORD}),
        ),
    )
    .await;
    let refresh_token = body["refreshToken"].as_str().unwrap().to_string();

    let (status, body, _) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            &json!({"refreshToken": refresh_token}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["accessToken"].as_str().is_some());

    let (status, _, cookies) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/auth/logout",
            None,
            &json!({"refreshToken": refresh_token}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));

    let (status, _, _) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            &json!({"refreshToken": refresh_token}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_role_gates() -> Result<()> {
    let app = setup_test_app().await?;
    let advertising = app.token_for("ads", Role::Advertising).await?;
    let manager = app.token_for("manager", Role::Manager).await?;

    let (status, body, _) = send(&app.router, get("/api/v1/orders", &advertising)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Недостаточно прав");

    let (status, _, _) = send(&app.router, get("/api/v1/leaflet-orders", &manager)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = send(&app.router, get("/api/v1/cities", &advertising)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/cities",
            Some(&advertising),
            &json!({"name": "Тула"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = send(&app.router, get("/api/v1/users", &manager)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_leaflet_order_flow_over_http() -> Result<()> {
    let app = setup_test_app().await?;
    let admin = app.token_for("boss", Role::Admin).await?;
    let ads = app.token_for("ads", Role::Advertising).await?;

    let (status, city, _) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/cities",
            Some(&admin),
            &json!({"name": "Москва"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, leaflet_body, _) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/leaflets",
            Some(&ads),
            &json!({"name": "Окна", "stock": 100}),
        ),
    )
    .await;
    let (_, distributor, _) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/distributors",
            Some(&ads),
            &json!({"name": "Анна", "phone": "+7 900", "cityId": city["id"]}),
        ),
    )
    .await;

    let params = |quantity: i64| {
        json!({
            "profitType": "CHS",
            "quantity": quantity,
            "leafletId": leaflet_body["id"],
            "cityId": city["id"],
            "distributorId": distributor["id"],
            "squareNumber": "B-7",
        })
    };

    let (status, body, _) = send(
        &app.router,
        json_request(Method::POST, "/api/v1/leaflet-orders", Some(&ads), &params(101)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Недостаточно листовок на складе");

    let (status, created, _) = send(
        &app.router,
        json_request(Method::POST, "/api/v1/leaflet-orders", Some(&ads), &params(30)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["state"], "IN_PROCESS");

    let uri = format!("/api/v1/leaflet-orders/{}/complete", created["id"]);
    let (status, done, _) = send(
        &app.router,
        json_request(
            Method::POST,
            &uri,
            Some(&ads),
            &json!({"distributed": 20, "returned": 10}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["state"], "DONE");
    assert_eq!(done["distributorProfit"], 30.0);

    let (status, _, _) = send(
        &app.router,
        json_request(Method::POST, &uri, Some(&ads), &json!({"cancel": true})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let leaflet_id = leaflet_body["id"].as_i64().unwrap();
    let stock = leaflet::get_leaflet_by_id(&app.state.db, leaflet_id)
        .await?
        .unwrap()
        .value;
    assert_eq!(stock, 80);

    let (status, logs, _) = send(&app.router, get("/api/v1/logs?category=leaflet_order", &ads)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs.as_array().unwrap().len(), 2);

    let (status, summary, _) = send(&app.router, get("/api/v1/stats/distribution", &ads)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totals"]["given"], 20);

    Ok(())
}

#[tokio::test]
async fn test_payment_proof_upload() -> Result<()> {
    let app = setup_test_app().await?;
    let ads = app.token_for("ads", Role::Advertising).await?;

    let leaflet = create_test_leaflet(&app.state.db, "Окна", 50).await?;
    let city = create_test_city(&app.state.db, "Москва").await?;
    let distributor = create_test_distributor(&app.state.db, "Анна").await?;
    let created = crate::core::leaflet_order::create_leaflet_order(
        &app.state.db,
        crate::core::leaflet_order::NewLeafletOrder {
            profit_type: crate::core::types::ProfitType::Mkd,
            quantity: 10,
            leaflet_id: leaflet.id,
            city_id: city.id,
            distributor_id: distributor.id,
            square_number: "C-3".to_string(),
        },
        "ads",
    )
    .await?;

    let boundary = "proof-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"check.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n--{boundary}--\r\n"
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/v1/leaflet-orders/{}/payment-proof", created.id))
        .header(header::AUTHORIZATION, format!("Bearer {ads}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, body, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["state"], "DONE");
    assert_eq!(body["document"]["originalName"], "check.png");
    assert_eq!(body["document"]["size"], 7);
    assert_eq!(app.notifier.messages().len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_bot_endpoints() -> Result<()> {
    let app = setup_test_app().await?;
    let manager = app.token_for("bot", Role::Manager).await?;
    let ads = app.token_for("ads", Role::Advertising).await?;

    let worker = create_test_worker(&app.state.db, "Олег").await?;
    let mut input = order_input(Utc::now() + Duration::minutes(15));
    input.worker_id = Some(worker.id);
    let soon = order::create_order(&app.state.db, input, "manager").await?;
    order::create_order(
        &app.state.db,
        order_input(Utc::now() + Duration::hours(3)),
        "manager",
    )
    .await?;

    let (status, _, _) = send(&app.router, get("/api/telegram", &ads)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, pending, _) =
        send(&app.router, get("/api/telegram?within_minutes=60", &manager)).await;
    assert_eq!(status, StatusCode::OK);
    let pending = pending.as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["id"], soon.id);
    assert_eq!(pending[0]["worker"], "Олег");

    let (status, _, _) = send(&app.router, get("/api/telegram?within_minutes=0", &manager)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body, _) = send(
        &app.router,
        json_request(
            Method::PATCH,
            "/api/telegram",
            Some(&manager),
            &json!({"ids": [soon.id]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 1);

    let (_, pending, _) = send(&app.router, get("/api/telegram", &manager)).await;
    assert!(pending.as_array().unwrap().is_empty());

    Ok(())
}
