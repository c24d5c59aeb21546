//! Router fixture over the in-memory store.

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use scholaris_api::{AppState, HttpSettings, create_router};
use scholaris_core::auth::{Role, SessionAuthority, SessionPolicy, hash_password};
use scholaris_core::fees::PaymentLedger;
use scholaris_core::memory::{MemoryStore, RecordingNotifier};
use scholaris_core::provisioning::{NewPrincipal, Provisioner};
use scholaris_shared::types::UserId;

pub const COOKIE_NAME: &str = "scholaris_session";
pub const SUPER_EMAIL: &str = "root@scholaris.test";
pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub async fn new() -> Self {
        let store = MemoryStore::new();
        store
            .seed_principal(NewPrincipal {
                id: UserId::new(),
                email: SUPER_EMAIL.into(),
                password_hash: hash_password(PASSWORD).unwrap(),
                full_name: "Root".into(),
                role: Role::SuperAdmin,
                school_id: None,
            })
            .await
            .unwrap();

        let authority = SessionAuthority::new(
            store.clone(),
            store.clone(),
            store.clone(),
            SessionPolicy::default(),
        );
        let ledger = PaymentLedger::new(
            store.clone(),
            RecordingNotifier::new(),
            chrono_tz::Asia::Kolkata,
        );
        let provisioner = Provisioner::new(store.clone(), store.clone());
        let state = AppState {
            authority,
            ledger,
            provisioner,
            settings: Arc::new(HttpSettings {
                cookie_name: COOKIE_NAME.into(),
                secure_cookie: false,
                request_timeout: Duration::from_secs(30),
            }),
        };

        Self {
            router: create_router(state),
            store,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> Reply {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        Reply {
            status,
            headers,
            body,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Reply {
        self.request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Logs in and returns the token.
    pub async fn token(&self, email: &str) -> String {
        let reply = self.login(email, PASSWORD).await;
        assert_eq!(reply.status, StatusCode::OK, "login failed: {}", reply.body);
        reply.body["token"].as_str().unwrap().to_owned()
    }

    /// Registers a school and returns `(school_id, admin_token)`.
    pub async fn school(&self, root: &str, admin_email: &str) -> (String, String) {
        let reply = self
            .request(
                Method::POST,
                "/api/v1/schools",
                Some(root),
                Some(json!({
                    "name": "Green Valley High",
                    "email": "office@greenvalley.test",
                    "admin_email": admin_email,
                    "admin_name": "Priya Admin",
                    "admin_password": PASSWORD,
                })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        let school_id = reply.body["id"].as_str().unwrap().to_owned();
        (school_id, self.token(admin_email).await)
    }

    /// Enrolls a student owing `total_fee` and returns its id.
    pub async fn student(
        &self,
        admin: &str,
        school_id: &str,
        admission_no: &str,
        user_id: Option<&str>,
        total_fee: &str,
    ) -> String {
        let reply = self
            .request(
                Method::POST,
                &format!("/api/v1/schools/{school_id}/students"),
                Some(admin),
                Some(json!({
                    "admission_no": admission_no,
                    "full_name": "Asha Verma",
                    "user_id": user_id,
                })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        let student_id = reply.body["id"].as_str().unwrap().to_owned();

        let reply = self
            .request(
                Method::POST,
                &format!("/api/v1/students/{student_id}/fee-structure"),
                Some(admin),
                Some(json!({ "academic_year": "2024-25", "total_fee": total_fee })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        student_id
    }

    pub async fn pay(&self, token: &str, student_id: &str, amount: &str) -> Reply {
        self.request(
            Method::POST,
            &format!("/api/v1/students/{student_id}/payments"),
            Some(token),
            Some(json!({ "amount": amount, "mode": "cash" })),
        )
        .await
    }
}
