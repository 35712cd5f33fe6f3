use maglo::core::config::AppConfig;
use maglo::core::currency::CurrencyCode;
use maglo::http::{PipelineListener, SilentListener};
use maglo::{AppCommand, AppContext};
use serde_json::json;
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod test_utils {
    use super::*;

    pub fn user_json() -> serde_json::Value {
        json!({
            "id": "u1",
            "fullName": "Jane Roe",
            "email": "jane@example.com",
            "role": "user",
            "isActive": true,
            "lastLoginAt": "2024-01-15T10:00:00Z",
            "lastLoginIP": "10.0.0.1",
            "createdAt": "2023-06-01T00:00:00Z",
            "updatedAt": "2024-01-15T10:00:00Z"
        })
    }

    fn metric(amount: f64, trend: &str) -> serde_json::Value {
        json!({"amount": amount, "currency": "USD", "change": {"percentage": 4.2, "trend": trend}})
    }

    pub async fn create_dashboard_server() -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/users/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "Login successful",
                "data": {"accessToken": "token-123", "user": user_json()}
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/financial/summary"))
            .and(header("authorization", "Bearer token-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "totalBalance": metric(5240.21, "up"),
                    "totalExpense": metric(250.8, "down"),
                    "totalSavings": metric(550.25, "stable"),
                    "lastUpdated": "2024-01-15T10:00:00Z"
                }
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/financial/transactions/recent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "transactions": [{
                        "id": "t1",
                        "name": "Iphone 13 Pro MAX",
                        "business": "Apple. Inc",
                        "type": "Mobile",
                        "amount": -420.84,
                        "currency": "USD",
                        "date": "2024-01-14T00:00:00Z",
                        "status": "completed"
                    }],
                    "summary": {"totalIncome": 0, "totalExpense": 420.84, "count": 1}
                }
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/financial/transfers/scheduled"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "transfers": [{
                        "id": "s1",
                        "name": "Saleh Ahmed",
                        "date": "2024-01-20T14:30:00Z",
                        "amount": -435.0,
                        "currency": "USD",
                        "status": "scheduled"
                    }],
                    "summary": {"totalScheduledAmount": 435.0, "count": 1}
                }
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/users/logout"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/usd.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "TRYUSD": 0.0308,
                "USDTRY": 32.4675,
                "_meta": {"updated_at": "2024-01-15T10:00:00Z"}
            })))
            .mount(&server)
            .await;

        server
    }

    /// Writes a config pointing both APIs at `server` and keeping data in `dir`.
    pub fn write_config(dir: &TempDir, server: &MockServer) -> std::path::PathBuf {
        let config_path = dir.path().join("config.yaml");
        let config_content = format!(
            r#"
            api:
              base_url: "{uri}"
              timeout_secs: 5
            exchange:
              base_url: "{uri}"
            currency: "TRY"
            locale: "en-US"
            data_path: "{data}"
        "#,
            uri = server.uri(),
            data = dir.path().join("data").display()
        );
        fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path
    }

    #[derive(Default)]
    pub struct Recorder {
        pub notifications: Mutex<Vec<String>>,
        pub navigations: Mutex<Vec<String>>,
    }

    impl PipelineListener for Recorder {
        fn notify(&self, message: &str) {
            self.notifications.lock().unwrap().push(message.to_string());
        }

        fn navigate(&self, route: &str) {
            self.navigations.lock().unwrap().push(route.to_string());
        }
    }
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let server = test_utils::create_dashboard_server().await;
    let dir = TempDir::new().unwrap();
    let config_path = test_utils::write_config(&dir, &server);
    let config = AppConfig::load_from_path(&config_path).unwrap();

    let context = AppContext::build(config, Arc::new(SilentListener))
        .await
        .unwrap();

    maglo::execute(
        &context,
        AppCommand::SignIn {
            email: "jane@example.com".to_string(),
            password: Some("Secret123!".to_string()),
        },
    )
    .await
    .unwrap();
    assert!(context.session().is_authenticated().await);
    assert_eq!(
        context.session().current_user().await.unwrap().full_name,
        "Jane Roe"
    );

    maglo::execute(&context, AppCommand::Summary).await.unwrap();

    maglo::execute(
        &context,
        AppCommand::Currency {
            code: Some(CurrencyCode::Usd),
        },
    )
    .await
    .unwrap();
    assert_eq!(context.preference.get(), CurrencyCode::Usd);

    maglo::execute(
        &context,
        AppCommand::Convert {
            amount: 1000.0,
            from: "TRY".to_string(),
        },
    )
    .await
    .unwrap();
    let engine = context.currency_engine().await;
    assert!((engine.convert(1000.0, "TRY") - 30.8).abs() < 1e-9);

    maglo::execute(&context, AppCommand::Logout).await.unwrap();
    assert!(!context.session().is_authenticated().await);

    let result = maglo::execute(&context, AppCommand::Summary).await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_invalid_sign_in_never_reaches_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_path = test_utils::write_config(&dir, &server);
    let result = maglo::run_command(
        AppCommand::SignIn {
            email: "not-an-email".to_string(),
            password: Some("short".to_string()),
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_summary_requires_a_session() {
    let server = test_utils::create_dashboard_server().await;
    let dir = TempDir::new().unwrap();
    let config_path = test_utils::write_config(&dir, &server);

    let result = maglo::run_command(AppCommand::Summary, Some(config_path.to_str().unwrap())).await;
    let error = result.unwrap_err();
    assert!(error.to_string().contains("not signed in"));
}

#[test_log::test(tokio::test)]
async fn test_expired_token_clears_session_and_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Login successful",
            "data": {"accessToken": "stale-token", "user": test_utils::user_json()}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Token expired"})),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = AppConfig::load_from_path(test_utils::write_config(&dir, &server)).unwrap();
    let listener = Arc::new(test_utils::Recorder::default());
    let context = AppContext::build(config, listener.clone()).await.unwrap();

    maglo::execute(
        &context,
        AppCommand::SignIn {
            email: "jane@example.com".to_string(),
            password: Some("Secret123!".to_string()),
        },
    )
    .await
    .unwrap();

    let result = maglo::execute(&context, AppCommand::WhoAmI).await;
    assert!(result.is_err());
    assert!(!context.session().is_authenticated().await);
    assert_eq!(*listener.navigations.lock().unwrap(), vec!["/signin"]);
    assert_eq!(listener.notifications.lock().unwrap().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_rates_without_feed_still_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/usd.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_path = test_utils::write_config(&dir, &server);
    let result = maglo::run_command(AppCommand::Rates, Some(config_path.to_str().unwrap())).await;
    assert!(result.is_ok(), "Rates failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_rejected_sign_in_reports_invalid_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = AppConfig::load_from_path(test_utils::write_config(&dir, &server)).unwrap();
    let listener = Arc::new(test_utils::Recorder::default());
    let context = AppContext::build(config, listener.clone()).await.unwrap();

    let error = maglo::execute(
        &context,
        AppCommand::SignIn {
            email: "jane@example.com".to_string(),
            password: Some("Wrong123!".to_string()),
        },
    )
    .await
    .unwrap_err();

    assert_eq!(error.to_string(), "Invalid email or password");
    assert!(!context.session().is_authenticated().await);
    assert_eq!(*listener.navigations.lock().unwrap(), vec!["/signin"]);
    assert_eq!(listener.notifications.lock().unwrap().len(), 1);
}
