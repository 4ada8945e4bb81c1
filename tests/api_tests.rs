mod common;

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};

use common::TestApp;
use local_route_finder::config::EnvironmentConfig;
use local_route_finder::services::otp_service::MAX_FAILED_ATTEMPTS;

/// Request as it arrives from `peer`, optionally through a proxy header.
fn from_peer(
    method: Method,
    uri: &str,
    peer: &str,
    forwarded_for: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let peer: SocketAddr = peer.parse().unwrap();
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .extension(ConnectInfo(peer));
    if let Some(forwarded_for) = forwarded_for {
        builder = builder.header("x-forwarded-for", forwarded_for);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn submit(app: &TestApp, body: Value) -> Value {
    let response = app.post("/routes", body).await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json().clone()
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::with_admin();
    let response = app.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json()["status"], "ok");
}

#[tokio::test]
async fn test_submit_approve_search_flow() {
    let app = TestApp::with_admin();
    let token = app.admin_token().await;

    let created = submit(
        &app,
        json!({ "fromName": "railway station", "toName": "college", "vehicleType": "BUS" }),
    )
    .await;
    assert_eq!(created["route"]["status"], "PENDING");
    assert_eq!(created["route"]["fromLocation"]["name"], "Railway Station");
    assert_eq!(created["ai"]["routeValidation"]["isSuspicious"], false);
    let id = created["route"]["id"].as_str().unwrap().to_string();

    let before = app.get("/routes?from=railway&to=college").await;
    assert_eq!(before.json()["routes"], json!([]));

    let approved = app
        .request(Method::PATCH, &format!("/routes/{}/approve", id), None, Some(&token))
        .await;
    assert_eq!(approved.status_code(), StatusCode::OK);
    assert_eq!(approved.json()["route"]["status"], "APPROVED");

    let found = app.get("/routes?from=railway&to=college").await;
    assert_eq!(found.status_code(), StatusCode::OK);
    let routes = found.json()["routes"].as_array().unwrap().clone();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0]["id"], id.as_str());

    let alias = app.get("/routes/search?from=RAILWAY&to=College").await;
    assert_eq!(alias.json()["routes"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_excludes_pending_and_rejected() {
    let app = TestApp::open();
    let body = json!({ "fromName": "Bidhannagar", "toName": "Benachity", "vehicleType": "SHARED_AUTO", "autoColor": "Green" });

    submit(&app, body.clone()).await;
    let rejected = submit(&app, body).await;
    let id = rejected["route"]["id"].as_str().unwrap();
    let response = app
        .request(Method::PATCH, &format!("/routes/{}/reject", id), None, None)
        .await;
    assert_eq!(response.json()["route"]["status"], "REJECTED");

    let found = app.get("/routes?from=bidhan&to=benachity").await;
    assert_eq!(found.json()["routes"], json!([]));
}

#[tokio::test]
async fn test_submission_validation_errors() {
    let app = TestApp::open();

    let missing = app.post("/routes", json!({ "vehicleType": "BUS" })).await;
    assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(missing.json()["error"], "ValidationError");

    let bad_vehicle = app
        .post("/routes", json!({ "fromName": "a", "toName": "b", "vehicleType": "ROCKET" }))
        .await;
    assert_eq!(bad_vehicle.status_code(), StatusCode::BAD_REQUEST);

    let negative = app
        .post(
            "/routes",
            json!({ "fromName": "a", "toName": "b", "vehicleType": "BUS", "minFare": -1, "maxFare": 5 }),
        )
        .await;
    assert_eq!(negative.status_code(), StatusCode::BAD_REQUEST);

    let unknown_id = app
        .post(
            "/routes",
            json!({
                "fromLocationId": "7d1f6a43-2b8e-4c55-9a51-0f3e0b7c2d11",
                "toLocationId": "7d1f6a43-2b8e-4c55-9a51-0f3e0b7c2d12",
                "vehicleType": "BUS"
            }),
        )
        .await;
    assert_eq!(unknown_id.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(unknown_id.json()["error"], "InvalidLocationId");

    let no_query = app.get("/routes").await;
    assert_eq!(no_query.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_moderation_not_found() {
    let app = TestApp::open();

    let unknown = app
        .request(
            Method::PATCH,
            "/routes/7d1f6a43-2b8e-4c55-9a51-0f3e0b7c2d11/approve",
            None,
            None,
        )
        .await;
    assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);

    let malformed = app
        .request(Method::PATCH, "/routes/not-a-uuid/reject", None, None)
        .await;
    assert_eq!(malformed.status_code(), StatusCode::NOT_FOUND);

    let delete = app
        .request(Method::DELETE, "/routes/7d1f6a43-2b8e-4c55-9a51-0f3e0b7c2d11", None, None)
        .await;
    assert_eq!(delete.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_terminal_state_conflict() {
    let app = TestApp::open();
    let created = submit(&app, json!({ "fromName": "a", "toName": "b", "vehicleType": "BUS" })).await;
    let id = created["route"]["id"].as_str().unwrap();

    let approve = format!("/routes/{}/approve", id);
    assert_eq!(app.request(Method::PATCH, &approve, None, None).await.status_code(), StatusCode::OK);
    assert_eq!(app.request(Method::PATCH, &approve, None, None).await.status_code(), StatusCode::OK);

    let reject = app
        .request(Method::PATCH, &format!("/routes/{}/reject", id), None, None)
        .await;
    assert_eq!(reject.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_fare_anomaly_is_advisory() {
    let app = TestApp::open();
    let created = submit(&app, json!({ "fromName": "Prantika", "toName": "City Centre", "vehicleType": "E_RICKSHAW" })).await;
    let route_id = created["route"]["id"].as_str().unwrap();

    let inverted = app
        .post("/fares", json!({ "routeId": route_id, "minFare": 50, "maxFare": 10 }))
        .await;
    assert_eq!(inverted.status_code(), StatusCode::CREATED);
    assert_eq!(inverted.json()["ai"]["fareAnomaly"]["isAnomalous"], true);
    let fare_id = inverted.json()["fare"]["id"].as_str().unwrap().to_string();

    let high = app
        .post(
            "/fares",
            json!({ "id": fare_id, "routeId": route_id, "minFare": 10, "maxFare": 250, "notes": "night" }),
        )
        .await;
    assert_eq!(high.status_code(), StatusCode::OK);
    assert_eq!(high.json()["ai"]["fareAnomaly"]["isAnomalous"], true);
    assert_eq!(high.json()["fare"]["maxFare"], 250);
    assert_eq!(high.json()["fare"]["id"], fare_id.as_str());

    let unknown_route = app
        .post(
            "/fares",
            json!({ "routeId": "7d1f6a43-2b8e-4c55-9a51-0f3e0b7c2d11", "minFare": 10, "maxFare": 20 }),
        )
        .await;
    assert_eq!(unknown_route.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(unknown_route.json()["error"], "InvalidRoute");
}

#[tokio::test]
async fn test_admin_gating() {
    let app = TestApp::with_admin();

    let anonymous = app.get("/routes/pending").await;
    assert_eq!(anonymous.status_code(), StatusCode::UNAUTHORIZED);

    let fares = app.post("/fares", json!({ "routeId": "7d1f6a43-2b8e-4c55-9a51-0f3e0b7c2d11", "minFare": 1, "maxFare": 2 })).await;
    assert_eq!(fares.status_code(), StatusCode::UNAUTHORIZED);

    let user_token = app
        .state
        .jwt
        .issue_user_token(&local_route_finder::models::User::with_phone("9999999999".into()))
        .unwrap();
    let as_user = app
        .request(Method::GET, "/routes/pending", None, Some(&user_token))
        .await;
    assert_eq!(as_user.status_code(), StatusCode::FORBIDDEN);

    let token = app.admin_token().await;
    let as_admin = app
        .request(Method::GET, "/routes/pending", None, Some(&token))
        .await;
    assert_eq!(as_admin.status_code(), StatusCode::OK);

    let verify = app
        .request(Method::GET, "/auth/admin/verify", None, Some(&token))
        .await;
    assert_eq!(verify.status_code(), StatusCode::OK);
    assert_eq!(verify.json()["user"]["role"], "ADMIN");
}

#[tokio::test]
async fn test_open_moderation_still_guards_verify() {
    let app = TestApp::open();
    assert_eq!(app.get("/routes/pending").await.status_code(), StatusCode::OK);
    assert_eq!(app.get("/routes/admin/all").await.status_code(), StatusCode::OK);
    assert_eq!(app.get("/auth/admin/verify").await.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_otp_login() {
    let app = TestApp::with_admin();

    let invalid = app.post("/auth/otp", json!({ "phone": "12ab" })).await;
    assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

    let requested = app.post("/auth/otp", json!({ "phone": "9876543210" })).await;
    assert_eq!(requested.status_code(), StatusCode::OK);
    assert_eq!(requested.json()["expiresIn"], 300);

    let wrong = app
        .post("/auth/login", json!({ "phone": "9876543210", "otp": "abcdef" }))
        .await;
    assert_eq!(wrong.status_code(), StatusCode::UNAUTHORIZED);

    let code = app.state.otp.issue("9876543210").await.unwrap();
    let login = app
        .post("/auth/login", json!({ "phone": "9876543210", "otp": code }))
        .await;
    assert_eq!(login.status_code(), StatusCode::OK);
    assert_eq!(login.json()["user"]["phone"], "9876543210");
    assert!(login.json()["token"].is_string());
}

#[tokio::test]
async fn test_admin_login_rejects_bad_password() {
    let app = TestApp::with_admin();
    let response = app
        .post("/auth/admin/login", json!({ "username": "admin", "password": "nope" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_locations_directory() {
    let app = TestApp::open();

    let created = app
        .post("/locations", json!({ "name": "salt lake  sector v", "type": "AREA", "lat": 22.57, "lng": 88.43 }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    assert_eq!(created.json()["name"], "Salt Lake Sector V");

    let duplicate = app
        .post("/locations", json!({ "name": "Salt Lake Sector V", "type": "AREA" }))
        .await;
    assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);
    assert_eq!(duplicate.json()["existingLocation"]["id"], created.json()["id"]);
    assert_eq!(duplicate.json()["existingLocation"]["name"], "Salt Lake Sector V");
    assert_eq!(duplicate.json()["existingLocation"]["type"], "AREA");

    let blank = app.post("/locations", json!({ "name": "  ", "type": "AREA" })).await;
    assert_eq!(blank.status_code(), StatusCode::BAD_REQUEST);

    let listed = app.get("/locations").await;
    assert_eq!(listed.json()["locations"][0]["city"], "Kolkata");

    let search = app.get("/locations/search?q=sector").await;
    assert_eq!(search.json()["locations"].as_array().unwrap().len(), 1);
    let empty = app.get("/locations/search").await;
    assert_eq!(empty.json()["locations"], json!([]));
}

#[tokio::test]
async fn test_city_listing() {
    let app = TestApp::open();
    let created = submit(&app, json!({ "fromName": "Howrah", "toName": "Park Street", "vehicleType": "BUS" })).await;
    let id = created["route"]["id"].as_str().unwrap();
    app.request(Method::PATCH, &format!("/routes/{}/approve", id), None, None).await;

    let listed = app.get("/routes/city?city=howrah").await;
    assert_eq!(listed.json()["totalRoutes"], 1);
    assert_eq!(listed.json()["city"], "howrah");

    let unknown = app.get("/routes/city?city=Pune").await;
    assert_eq!(unknown.json()["totalRoutes"], 0);
    assert!(unknown.json()["message"].is_string());
}

#[tokio::test]
async fn test_rate_limit() {
    let app = TestApp::new(EnvironmentConfig {
        rate_limit_requests: 3,
        ..EnvironmentConfig::default()
    });

    for _ in 0..3 {
        assert_eq!(app.get("/health").await.status_code(), StatusCode::OK);
    }
    let limited = app.get("/health").await;
    assert_eq!(limited.status_code(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.json()["error"], "RateLimitExceeded");
}

#[tokio::test]
async fn test_unknown_path() {
    let app = TestApp::open();
    assert_eq!(app.get("/nowhere").await.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_direct_clients_have_separate_budgets() {
    let app = TestApp::new(EnvironmentConfig {
        rate_limit_requests: 2,
        ..EnvironmentConfig::default()
    });

    for _ in 0..2 {
        let ok = app.send(from_peer(Method::GET, "/health", "198.51.100.1:40000", None, None)).await;
        assert_eq!(ok.status_code(), StatusCode::OK);
    }
    let limited = app.send(from_peer(Method::GET, "/health", "198.51.100.1:40001", None, None)).await;
    assert_eq!(limited.status_code(), StatusCode::TOO_MANY_REQUESTS);

    let other = app.send(from_peer(Method::GET, "/health", "198.51.100.2:40000", None, None)).await;
    assert_eq!(other.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_forwarded_for_is_ignored_from_direct_clients() {
    let app = TestApp::new(EnvironmentConfig {
        auth_rate_limit_requests: 3,
        ..common::admin_config()
    });
    let body = json!({ "phone": "9876543210", "otp": "000000" });

    for i in 0..3 {
        let forwarded = format!("203.0.113.{}", i);
        let response = app
            .send(from_peer(Method::POST, "/auth/login", "198.51.100.9:5000", Some(&forwarded), Some(body.clone())))
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    let limited = app
        .send(from_peer(Method::POST, "/auth/login", "198.51.100.9:5000", Some("203.0.113.99"), Some(body)))
        .await;
    assert_eq!(limited.status_code(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_forwarded_for_keys_clients_behind_trusted_proxy() {
    let app = TestApp::new(EnvironmentConfig {
        rate_limit_requests: 1,
        trust_proxy: true,
        ..EnvironmentConfig::default()
    });
    let proxy = "10.0.0.1:443";

    let first = app.send(from_peer(Method::GET, "/health", proxy, Some("203.0.113.1"), None)).await;
    assert_eq!(first.status_code(), StatusCode::OK);
    let second = app.send(from_peer(Method::GET, "/health", proxy, Some("203.0.113.2"), None)).await;
    assert_eq!(second.status_code(), StatusCode::OK);
    let repeat = app.send(from_peer(Method::GET, "/health", proxy, Some("203.0.113.1"), None)).await;
    assert_eq!(repeat.status_code(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_wrong_otp_guesses_revoke_code() {
    let app = TestApp::with_admin();
    let code = app.state.otp.issue("9876543210").await.unwrap();
    let wrong = if code == "000000" { "111111" } else { "000000" };

    for _ in 0..MAX_FAILED_ATTEMPTS {
        let response = app
            .post("/auth/login", json!({ "phone": "9876543210", "otp": wrong }))
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    let revoked = app
        .post("/auth/login", json!({ "phone": "9876543210", "otp": code }))
        .await;
    assert_eq!(revoked.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_query_is_json_error() {
    let app = TestApp::open();

    let city = app.get("/routes/city?city=Pune&city=Kolkata").await;
    assert_eq!(city.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(city.json()["error"], "ValidationError");

    let locations = app.get("/locations/search?q=a&q=b").await;
    assert_eq!(locations.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(locations.json()["code"], "BAD_REQUEST");
}
