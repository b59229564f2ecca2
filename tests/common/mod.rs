#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dinnerfood_rs::{
    create_app,
    models::{Dinner, Food},
    observability::{BusinessTracingMiddleware, DatabaseTracingMiddleware, Metrics},
    repositories::{connect_in_memory, SqliteDinnerRepository, SqliteFoodRepository},
    services::{DinnerService, FoodService},
    AppState, Config,
};
use reqwest::{Client, Response};
use serde_json::json;
use sqlx::SqlitePool;
use tokio::net::TcpListener;

/// Real router served on an ephemeral port, backed by a private in-memory store
pub struct TestEnvironment {
    pub client: Client,
    pub base_url: String,
    pub pool: SqlitePool,
    pub metrics: Arc<Metrics>,
}

impl TestEnvironment {
    pub async fn new() -> Self {
        let config = Config::from_map(HashMap::new()).expect("Failed to build test config");

        let pool = connect_in_memory()
            .await
            .expect("Failed to open in-memory database");
        let metrics = Arc::new(Metrics::new().expect("Failed to create metrics"));

        let db_tracing = DatabaseTracingMiddleware::new(metrics.clone());
        let dinner_repository = Arc::new(
            SqliteDinnerRepository::new(pool.clone()).with_db_tracing(db_tracing.clone()),
        );
        let food_repository =
            Arc::new(SqliteFoodRepository::new(pool.clone()).with_db_tracing(db_tracing));

        let business_tracing = BusinessTracingMiddleware::new(metrics.clone());
        let state = AppState {
            dinner_service: Arc::new(
                DinnerService::new(dinner_repository, food_repository.clone())
                    .with_business_tracing(business_tracing.clone()),
            ),
            food_service: Arc::new(
                FoodService::new(food_repository).with_business_tracing(business_tracing),
            ),
            pool: pool.clone(),
            metrics: metrics.clone(),
        };

        let app = create_app(state, &config.server);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local address");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Failed to serve app");
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(50)).await;

        Self {
            client: Client::new(),
            base_url: format!("http://{}", addr),
            pool,
            metrics,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn create_dinner(&self, name: &str) -> Dinner {
        let response = self
            .client
            .post(self.url("/Dinner"))
            .json(&json!({ "name": name }))
            .send()
            .await
            .expect("Failed to create dinner");
        assert_eq!(response.status().as_u16(), 201);
        response.json().await.expect("Failed to parse dinner")
    }

    pub async fn create_food(&self, name: &str) -> Food {
        let response = self
            .client
            .post(self.url("/api/Food"))
            .json(&json!({ "name": name }))
            .send()
            .await
            .expect("Failed to create food");
        assert_eq!(response.status().as_u16(), 201);
        response.json().await.expect("Failed to parse food")
    }

    pub async fn get_dinner(&self, id: i64) -> Response {
        self.client
            .get(self.url(&format!("/Dinner/{}", id)))
            .send()
            .await
            .expect("Failed to get dinner")
    }

    pub async fn get_food(&self, id: i64) -> Response {
        self.client
            .get(self.url(&format!("/api/Food/{}", id)))
            .send()
            .await
            .expect("Failed to get food")
    }

    pub async fn add_food(&self, dinner_id: i64, food_id: i64) -> Response {
        self.client
            .post(self.url(&format!("/Dinner/{}/foods/{}", dinner_id, food_id)))
            .send()
            .await
            .expect("Failed to add food to dinner")
    }

    pub async fn remove_food(&self, dinner_id: i64, food_id: i64) -> Response {
        self.client
            .delete(self.url(&format!("/Dinner/{}/foods/{}", dinner_id, food_id)))
            .send()
            .await
            .expect("Failed to remove food from dinner")
    }
}

/// Read the `error` field of a JSON error body
pub async fn error_message(response: Response) -> String {
    let body: serde_json::Value = response.json().await.expect("Failed to parse error body");
    assert!(body["timestamp"].is_string(), "error body carries a timestamp");
    body["error"]
        .as_str()
        .expect("Expected error message")
        .to_string()
}
