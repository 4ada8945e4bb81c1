use colored::*;
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use std::env;

struct Smoke {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl Smoke {
    async fn call(&self, method: Method, path: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
        let mut request = self.client.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }
}

fn step(title: &str) {
    println!();
    println!("{}", title.bright_cyan().bold());
}

fn check(label: &str, ok: bool) -> anyhow::Result<()> {
    if ok {
        println!("  {} {}", "✅".green(), label);
        Ok(())
    } else {
        println!("  {} {}", "❌".red(), label.bright_red());
        anyhow::bail!("check failed: {}", label)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("{}", "🚌 Local Route Finder smoke test".bright_blue().bold());
    println!("{}", "================================".bright_blue());

    let base_url = env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:4000".to_string());
    println!("📡 {}", base_url);

    let mut smoke = Smoke {
        client: Client::new(),
        base_url,
        token: None,
    };

    step("1. Health");
    let (status, _) = smoke.call(Method::GET, "/health", None).await?;
    check("GET /health answers 200", status == StatusCode::OK)?;

    step("2. Admin login");
    match (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
        (Ok(username), Ok(password)) => {
            let (status, body) = smoke
                .call(
                    Method::POST,
                    "/auth/admin/login",
                    Some(json!({ "username": username, "password": password })),
                )
                .await?;
            check("admin login accepted", status == StatusCode::OK)?;
            smoke.token = body["token"].as_str().map(str::to_string);
        }
        _ => println!("  {}", "ADMIN_USERNAME/ADMIN_PASSWORD not set, moderating anonymously".yellow()),
    }

    step("3. Submit a route");
    let (status, body) = smoke
        .call(
            Method::POST,
            "/routes",
            Some(json!({
                "fromName": "railway station",
                "toName": "college",
                "vehicleType": "BUS",
                "minFare": 10,
                "maxFare": 20
            })),
        )
        .await?;
    check("submission answers 201", status == StatusCode::CREATED)?;
    check("route starts PENDING", body["route"]["status"] == "PENDING")?;
    let id = body["route"]["id"].as_str().unwrap_or_default().to_string();
    println!("  🆔 {}", id);

    step("4. Approve it");
    let (status, body) = smoke
        .call(Method::PATCH, &format!("/routes/{}/approve", id), None)
        .await?;
    check("approval answers 200", status == StatusCode::OK)?;
    check("route is APPROVED", body["route"]["status"] == "APPROVED")?;

    step("5. Search");
    let (status, body) = smoke
        .call(Method::GET, "/routes?from=railway&to=college", None)
        .await?;
    check("search answers 200", status == StatusCode::OK)?;
    let found = body["routes"]
        .as_array()
        .map(|routes| routes.iter().any(|route| route["id"] == id.as_str()))
        .unwrap_or(false);
    check("approved route is listed", found)?;

    step("6. Clean up");
    let (status, _) = smoke.call(Method::DELETE, &format!("/routes/{}", id), None).await?;
    check("route deleted", status == StatusCode::OK)?;

    println!();
    println!("{}", "🎉 All checks passed".bright_green().bold());
    Ok(())
}
