use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use opentelemetry::trace::{Status, TraceContextExt};
use std::{future::Future, sync::Arc, time::Instant};
use tracing::{error, info, instrument, warn, Instrument};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use super::Metrics;

fn header_value<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
}

/// Wraps every request in a server span named after the matched route and
/// records request count, latency and in-flight gauges.
pub async fn observability_middleware(
    metrics: Arc<Metrics>,
    request: Request,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();
    let uri = request.uri().to_string();

    let user_agent = header_value(&request, "user-agent")
        .unwrap_or("unknown")
        .to_string();

    // First hop of X-Forwarded-For wins over X-Real-IP
    let client_ip = header_value(&request, "x-forwarded-for")
        .and_then(|value| value.split(',').next())
        .or_else(|| header_value(&request, "x-real-ip"))
        .unwrap_or("unknown")
        .trim()
        .to_string();

    // Group by route template so /Dinner/1 and /Dinner/2 share a series
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched_path| matched_path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let span_name = format!("{} {}", method, endpoint);
    let span = tracing::info_span!(
        target: "dinnerfood_rs::http",
        "{}", span_name,
        otel.name = %span_name,
        otel.kind = "server",
        http.method = %method,
        http.route = %endpoint,
        http.url = %uri,
        http.user_agent = %user_agent,
        client.address = %client_ip,
        http.response.status_code = tracing::field::Empty,
        http.response_time_ms = tracing::field::Empty,
    );

    async {
        metrics.increment_in_flight(&method, &endpoint);

        let current_span = tracing::Span::current();
        let trace_id = current_span
            .context()
            .span()
            .span_context()
            .trace_id()
            .to_string();

        info!(trace_id = %trace_id, method = %method, path = %endpoint, client_ip = %client_ip, "Processing request");

        let response = next.run(request).await;

        let duration = start_time.elapsed();
        let duration_ms = duration.as_millis();
        let status_code = response.status().as_u16();

        current_span.record("http.response.status_code", status_code);
        current_span.record("http.response_time_ms", duration_ms);

        let otel_context = current_span.context();
        if status_code >= 500 {
            otel_context
                .span()
                .set_status(Status::error("HTTP server error"));
        } else {
            otel_context.span().set_status(Status::Ok);
        }

        metrics.record_http_request(&method, &endpoint, status_code, duration.as_secs_f64());
        metrics.decrement_in_flight(&method, &endpoint);

        if status_code >= 500 {
            error!(
                trace_id = %trace_id,
                method = %method,
                path = %endpoint,
                status_code = status_code,
                duration_ms = duration_ms,
                user_agent = %user_agent,
                "Request failed"
            );
        } else if status_code >= 400 {
            warn!(
                trace_id = %trace_id,
                method = %method,
                path = %endpoint,
                status_code = status_code,
                duration_ms = duration_ms,
                "Request rejected"
            );
        } else {
            info!(
                trace_id = %trace_id,
                method = %method,
                path = %endpoint,
                status_code = status_code,
                duration_ms = duration_ms,
                "Request completed successfully"
            );
        }

        response
    }
    .instrument(span)
    .await
}

/// Records outcome and latency of store calls
#[derive(Clone)]
pub struct DatabaseTracingMiddleware {
    metrics: Arc<Metrics>,
}

impl DatabaseTracingMiddleware {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }

    #[instrument(skip_all, fields(operation = %operation, table = %table))]
    pub async fn trace_operation<F, T, E>(
        &self,
        operation: &str,
        table: &str,
        future: F,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let start_time = Instant::now();
        let result = future.await;
        let duration = start_time.elapsed();

        self.metrics.record_database_operation(
            operation,
            table,
            result.is_ok(),
            duration.as_secs_f64(),
        );

        match &result {
            Ok(_) => info!(
                duration_ms = duration.as_millis(),
                "Database operation completed"
            ),
            Err(error) => error!(
                error = %error,
                duration_ms = duration.as_millis(),
                "Database operation failed"
            ),
        }

        result
    }
}

/// Records dinner and food service outcomes
#[derive(Clone)]
pub struct BusinessTracingMiddleware {
    metrics: Arc<Metrics>,
}

impl BusinessTracingMiddleware {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }

    #[instrument(skip_all, fields(operation = %operation, dinner_id = dinner_id))]
    pub async fn trace_dinner_operation<F, T, E>(
        &self,
        operation: &str,
        dinner_id: Option<i64>,
        future: F,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let start_time = Instant::now();
        let result = future.await;

        self.metrics
            .record_dinner_operation(operation, result.is_ok());

        match &result {
            Ok(_) => info!(
                duration_ms = start_time.elapsed().as_millis(),
                "Dinner operation completed"
            ),
            Err(error) => warn!(
                error = %error,
                duration_ms = start_time.elapsed().as_millis(),
                "Dinner operation failed"
            ),
        }

        result
    }

    #[instrument(skip_all, fields(operation = %operation, food_id = food_id))]
    pub async fn trace_food_operation<F, T, E>(
        &self,
        operation: &str,
        food_id: Option<i64>,
        future: F,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let start_time = Instant::now();
        let result = future.await;

        self.metrics.record_food_operation(operation, result.is_ok());

        match &result {
            Ok(_) => info!(
                duration_ms = start_time.elapsed().as_millis(),
                "Food operation completed"
            ),
            Err(error) => warn!(
                error = %error,
                duration_ms = start_time.elapsed().as_millis(),
                "Food operation failed"
            ),
        }

        result
    }
}
