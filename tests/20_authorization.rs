mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

const ADMIN_ONLY_ROUTES: &[(&str, &str)] = &[
    ("POST", "/api/students"),
    ("DELETE", "/api/students/STU001"),
    ("POST", "/api/departments"),
    ("PUT", "/api/departments/1"),
    ("DELETE", "/api/departments/1"),
    ("POST", "/api/faculty"),
    ("PUT", "/api/faculty/1"),
    ("DELETE", "/api/faculty/1"),
    ("POST", "/api/courses"),
    ("DELETE", "/api/courses/1"),
    ("DELETE", "/api/scores/1"),
];

const STAFF_ROUTES: &[(&str, &str)] = &[("POST", "/api/scores"), ("PUT", "/api/scores/1")];

async fn call(
    server: &common::TestServer,
    method: &str,
    path: &str,
    token: Option<&str>,
) -> Result<(StatusCode, Value)> {
    let method = Method::from_bytes(method.as_bytes())?;
    let mut request = server
        .client
        .request(method, server.url(path))
        .json(&json!({ "name": "ECE2", "student_id": "S1" }));
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    let res = request.send().await?;
    let status = res.status();
    Ok((status, res.json::<Value>().await?))
}

#[tokio::test]
async fn gated_routes_require_a_token() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    for (method, path) in ADMIN_ONLY_ROUTES.iter().chain(STAFF_ROUTES) {
        let (status, body) = call(&server, method, path, None).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, path);
        assert_eq!(body, json!({ "error": "Unauthorized" }));

        let (status, _) = call(&server, method, path, Some("not-a-real-token")).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {} with unknown token", method, path);
    }
    Ok(())
}

#[tokio::test]
async fn student_role_is_forbidden_everywhere() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.student_token().await?;

    for (method, path) in ADMIN_ONLY_ROUTES.iter().chain(STAFF_ROUTES) {
        let (status, body) = call(&server, method, path, Some(&token)).await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} {}", method, path);
        assert_eq!(body, json!({ "error": "Forbidden" }));
    }
    Ok(())
}

#[tokio::test]
async fn faculty_reaches_score_writes_only() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.faculty_token().await?;

    for (method, path) in ADMIN_ONLY_ROUTES {
        let (status, _) = call(&server, method, path, Some(&token)).await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} {}", method, path);
    }

    // Past the gate the handler needs the database, which is unreachable.
    for (method, path) in STAFF_ROUTES {
        let (status, body) = call(&server, method, path, Some(&token)).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{} {}", method, path);
        assert_eq!(body, json!({ "error": "Database connection failed" }));
    }
    Ok(())
}

#[tokio::test]
async fn admin_passes_every_gate() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.admin_token().await?;

    for (method, path) in ADMIN_ONLY_ROUTES.iter().chain(STAFF_ROUTES) {
        let (status, body) = call(&server, method, path, Some(&token)).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{} {}", method, path);
        assert_eq!(body, json!({ "error": "Database connection failed" }));
    }
    Ok(())
}

#[tokio::test]
async fn malformed_authorization_headers_fail_closed() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.admin_token().await?;

    for header in [token.clone(), format!("Basic {}", token), "Bearer ".to_string(), format!("bearer{}", token)] {
        let res = server
            .client
            .post(server.url("/api/departments"))
            .header("Authorization", header.clone())
            .json(&json!({ "name": "ECE2" }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "header {:?}", header);
    }
    Ok(())
}
