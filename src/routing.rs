//! Application router configuration.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::get,
};

use crate::{
    AppState,
    category::get_categories_endpoint,
    dashboard::get_dashboard_page,
    endpoints,
    health::get_health_endpoint,
    not_found::get_404_not_found,
    request_guard::{rate_limit, require_json_content_type},
    summary::get_summary_endpoint,
    transaction::{
        create_transaction_endpoint, delete_transaction_by_query_endpoint,
        delete_transaction_endpoint, edit_transaction_endpoint, get_transaction_endpoint,
        get_transactions_page, list_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Every request passes the rate limiter, then the JSON content type check.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            get(list_transactions_endpoint)
                .post(create_transaction_endpoint)
                .delete(delete_transaction_by_query_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(edit_transaction_endpoint)
                .patch(edit_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(endpoints::SUMMARY, get(get_summary_endpoint))
        .route(endpoints::CATEGORIES, get(get_categories_endpoint))
        .route(endpoints::HEALTH, get(get_health_endpoint));

    let view_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page));

    view_routes
        .merge(api_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(require_json_content_type))
        .layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit,
        ))
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::DASHBOARD_VIEW);
    }
}

#[cfg(test)]
mod api_tests {
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{
        AppState,
        endpoints::{self, format_endpoint},
        pagination::PaginationConfig,
        rate_limit::RateLimitConfig,
        test_utils::get_test_app_state,
    };

    use super::build_router;

    fn get_test_server() -> TestServer {
        TestServer::new(build_router(get_test_app_state())).expect("Could not create test server.")
    }

    async fn create(server: &TestServer, body: Value) -> Value {
        let response = server.post(endpoints::TRANSACTIONS_API).json(&body).await;
        response.assert_status(StatusCode::CREATED);

        response.json::<Value>()["data"].clone()
    }

    #[tokio::test]
    async fn create_then_get_transaction() {
        let server = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .json(&json!({
                "type": "EXPENSE",
                "amount": 12.5,
                "category": "Food & Dining",
                "description": "  <b>Lunch</b> ",
                "createdAt": "2025-03-02T12:30:00Z"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<Value>();
        assert_eq!(body["message"], "Transaction created successfully");
        let created = &body["data"];
        assert_eq!(created["type"], "EXPENSE");
        assert_eq!(created["amount"], 12.5);
        assert_eq!(created["description"], "bLunch/b");

        let id = created["id"].as_i64().expect("id should be an integer");
        let response = server.get(&format_endpoint(endpoints::TRANSACTION, id)).await;

        response.assert_status_ok();
        assert_eq!(&response.json::<Value>()["data"], created);
    }

    #[tokio::test]
    async fn create_with_invalid_data_is_bad_request() {
        let server = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .json(&json!({"type": "OTHER", "amount": 5, "category": "Food"}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({
            "error": "Data validation failed",
            "details": "Invalid transaction type. Must be one of: INCOME, EXPENSE"
        }));
    }

    #[tokio::test]
    async fn create_without_json_content_type_is_rejected() {
        let server = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .text(r#"{"type": "INCOME", "amount": 5, "category": "Gift"}"#)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["error"],
            "Content-Type must be application/json"
        );
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let server = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .text("{not json")
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "Invalid JSON format");
    }

    #[tokio::test]
    async fn list_transactions_is_paginated_and_filtered() {
        let server = get_test_server();
        for day in 1..=3 {
            create(
                &server,
                json!({
                    "type": "EXPENSE",
                    "amount": day,
                    "category": "Groceries",
                    "createdAt": format!("2025-03-0{day}T10:00:00Z")
                }),
            )
            .await;
        }
        create(
            &server,
            json!({"type": "INCOME", "amount": 100, "category": "Salary", "createdAt": "2025-03-04T10:00:00Z"}),
        )
        .await;

        let response = server
            .get(endpoints::TRANSACTIONS_API)
            .add_query_param("type", "EXPENSE")
            .add_query_param("category", "grocer")
            .add_query_param("limit", "2")
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        let amounts: Vec<f64> = body["data"]
            .as_array()
            .expect("data should be an array")
            .iter()
            .filter_map(|transaction| transaction["amount"].as_f64())
            .collect();
        assert_eq!(amounts, [3.0, 2.0]);
        assert_eq!(
            body["pagination"],
            json!({
                "page": 1,
                "limit": 2,
                "totalCount": 3,
                "totalPages": 2,
                "hasNext": true,
                "hasPrev": false
            })
        );
    }

    #[tokio::test]
    async fn list_rejects_invalid_pagination() {
        let server = get_test_server();

        let response = server
            .get(endpoints::TRANSACTIONS_API)
            .add_query_param("limit", "101")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn huge_page_is_empty_with_metadata() {
        let server = get_test_server();
        create(&server, json!({"type": "INCOME", "amount": 5, "category": "Gift"})).await;

        let response = server
            .get(endpoints::TRANSACTIONS_API)
            .add_query_param("page", "1000000000000000000")
            .add_query_param("limit", "100")
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["data"], json!([]));
        assert_eq!(
            body["pagination"],
            json!({
                "page": 1_000_000_000_000_000_000_u64,
                "limit": 100,
                "totalCount": 1,
                "totalPages": 1,
                "hasNext": false,
                "hasPrev": true
            })
        );
    }

    #[tokio::test]
    async fn backdated_transactions_can_be_created_and_listed() {
        let server = get_test_server();
        let created = create(
            &server,
            json!({
                "type": "INCOME",
                "amount": 20,
                "category": "Inheritance",
                "createdAt": "1600-01-01T00:00:00Z"
            }),
        )
        .await;
        assert_eq!(created["createdAt"], "1600-01-01T00:00:00Z");

        let response = server
            .get(endpoints::TRANSACTIONS_API)
            .add_query_param("startDate", "1600-01-01")
            .add_query_param("endDate", "9999-12-31")
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["data"], json!([created]));
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let server = get_test_server();
        let created = create(
            &server,
            json!({"type": "INCOME", "amount": 50, "category": "Gift", "description": "Birthday"}),
        )
        .await;
        let id = created["id"].as_i64().expect("id should be an integer");

        let response = server
            .patch(&format_endpoint(endpoints::TRANSACTION, id))
            .json(&json!({"amount": 75.25}))
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["message"], "Transaction updated successfully");
        assert_eq!(body["data"]["amount"], 75.25);
        assert_eq!(body["data"]["category"], "Gift");
        assert_eq!(body["data"]["description"], "Birthday");
    }

    #[tokio::test]
    async fn update_missing_transaction_is_not_found_even_with_bad_body() {
        let server = get_test_server();

        let response = server
            .put(&format_endpoint(endpoints::TRANSACTION, 999))
            .json(&json!({"amount": -1}))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&json!({"error": "Transaction not found"}));
    }

    #[tokio::test]
    async fn invalid_id_is_bad_request() {
        let server = get_test_server();

        let response = server.get("/api/transactions/abc").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({
            "error": "Invalid request data",
            "details": "Invalid ID format"
        }));
    }

    #[tokio::test]
    async fn delete_by_path_and_by_query() {
        let server = get_test_server();
        let first = create(&server, json!({"type": "INCOME", "amount": 1, "category": "Gift"})).await;
        let second = create(&server, json!({"type": "INCOME", "amount": 2, "category": "Gift"})).await;
        let first_id = first["id"].as_i64().expect("id should be an integer");
        let second_id = second["id"].as_i64().expect("id should be an integer");

        let response = server
            .delete(&format_endpoint(endpoints::TRANSACTION, first_id))
            .await;
        response.assert_status_ok();
        response.assert_json(&json!({"message": "Transaction deleted successfully"}));

        server
            .delete(endpoints::TRANSACTIONS_API)
            .add_query_param("id", second_id)
            .await
            .assert_status_ok();

        server
            .get(&format_endpoint(endpoints::TRANSACTION, second_id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .delete(&format_endpoint(endpoints::TRANSACTION, first_id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn summary_for_custom_period() {
        let server = get_test_server();
        create(&server, json!({"type": "INCOME", "amount": 1000, "category": "Salary", "createdAt": "2024-05-01T09:00:00Z"})).await;
        create(&server, json!({"type": "EXPENSE", "amount": 300, "category": "Food", "createdAt": "2024-05-02T09:00:00Z"})).await;
        create(&server, json!({"type": "EXPENSE", "amount": 200, "category": "Food", "createdAt": "2024-05-31T21:00:00Z"})).await;

        let response = server
            .get(endpoints::SUMMARY)
            .add_query_param("startDate", "2024-05-01")
            .add_query_param("endDate", "2024-05-31")
            .await;

        response.assert_status_ok();
        let data = &response.json::<Value>()["data"];
        assert_eq!(
            data["summary"],
            json!({"income": 1000.0, "expense": 500.0, "netIncome": 500.0, "transactionCount": 3})
        );
        assert_eq!(data["breakdown"]["expenseByCategory"], json!({"Food": 500.0}));
        assert_eq!(data["period"]["type"], "custom");
    }

    #[tokio::test]
    async fn categories_and_health() {
        let server = get_test_server();

        let categories = server.get(endpoints::CATEGORIES).await;
        categories.assert_status_ok();
        assert_eq!(categories.json::<Value>()["data"]["categories"]["INCOME"][0], "Salary");

        let health = server.get(endpoints::HEALTH).await;
        health.assert_status_ok();
        assert_eq!(health.json::<Value>()["database"], "connected");
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let server = get_test_server();

        let response = server.get("/api/nothing-here").await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&json!({"error": "Not found"}));
    }

    #[tokio::test]
    async fn html_views_render() {
        let server = get_test_server();

        for path in [endpoints::DASHBOARD_VIEW, endpoints::TRANSACTIONS_VIEW] {
            let response = server.get(path).await;

            response.assert_status_ok();
            assert!(
                response.text().contains("<table class=\"calendar\">"),
                "{path} should render a calendar"
            );
        }
    }

    #[tokio::test]
    async fn requests_over_the_limit_are_rejected() {
        let state = AppState::new(
            Connection::open_in_memory().expect("Could not open database in memory."),
            "Etc/UTC",
            PaginationConfig::default(),
            RateLimitConfig {
                max_requests: 2,
                window: Duration::from_secs(60),
            },
        )
        .expect("Could not create app state.");
        let server = TestServer::new(build_router(state)).expect("Could not create test server.");

        server.get(endpoints::CATEGORIES).await.assert_status_ok();
        server.get(endpoints::CATEGORIES).await.assert_status_ok();
        server
            .get(endpoints::CATEGORIES)
            .await
            .assert_status(StatusCode::TOO_MANY_REQUESTS);
        server.get(endpoints::HEALTH).await.assert_status_ok();
    }
}
