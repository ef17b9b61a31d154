mod common;

use std::time::Duration;

use neaktor::{NeaktorClient, NeaktorConfig, NeaktorError, OAuthCredentials, ServiceErrorKind};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{client_for, config_for, model_listing, mount_model_listing, TOKEN};

#[tokio::test]
async fn test_get_model_by_title_resolves_statuses_and_fields() {
    let server = MockServer::start().await;
    mount_model_listing(&server).await;

    let client = client_for(&server);
    let model = client.get_model_by_title("Заказ").await.unwrap();

    assert_eq!(model.id(), "m-order");
    assert_eq!(model.get_status("новый заказ").unwrap().id, "s-new");
    assert_eq!(model.get_status("ошибочный заказ").unwrap().id, "s-wrong");
    assert_eq!(model.get_field("email").unwrap().id, "f-email");
    assert_eq!(model.get_field("пароль").unwrap().id, "f-password");
    assert!(model.all_statuses()["s-wrong"].closed);
}

#[tokio::test]
async fn test_model_listing_fetched_once_within_ttl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/taskmodels"))
        .and(header("Authorization", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_listing()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = client.get_model_by_title("Заказ").await.unwrap();
    let second = client.get_model_by_title("Заказ").await.unwrap();

    // outros modelos da mesma listagem também ficam em cache
    let other = client.get_model_by_title("Клиент").await.unwrap();

    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(other.id(), "m-client");
    assert_eq!(client.cached_model_count().await, 2);
}

#[tokio::test]
async fn test_expired_model_is_refetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/taskmodels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_listing()))
        .expect(2)
        .mount(&server)
        .await;

    let config = NeaktorConfig {
        cache_ttl_secs: 0,
        ..config_for(&server)
    };
    let client = NeaktorClient::from_config(config).unwrap();

    client.get_model_by_title("Заказ").await.unwrap();
    let model = client.get_model_by_title("Заказ").await.unwrap();

    assert_eq!(model.id(), "m-order");
}

#[tokio::test]
async fn test_invalidate_models_forces_refetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/taskmodels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_listing()))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.get_model_by_title("Заказ").await.unwrap();
    client.invalidate_models().await;
    assert_eq!(client.cached_model_count().await, 0);

    client.get_model_by_title("Заказ").await.unwrap();
}

#[tokio::test]
async fn test_model_title_is_exact_match() {
    let server = MockServer::start().await;
    mount_model_listing(&server).await;

    let client = client_for(&server);
    let result = client.get_model_by_title("заказ").await;

    assert!(matches!(result, Err(NeaktorError::ModelNotFound(title)) if title == "заказ"));
}

#[tokio::test]
async fn test_model_listing_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/taskmodels"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.get_model_by_title("Заказ").await;

    assert!(matches!(
        result,
        Err(NeaktorError::ServiceUnavailable { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_model_listing_classified_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/taskmodels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "error",
            "message": "access denied",
            "code": "403 FORBIDDEN"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.get_model_by_title("Заказ").await.unwrap_err();

    assert_eq!(err.service_kind(), Some(ServiceErrorKind::Forbidden));
    assert_eq!(client.cached_model_count().await, 0);
}

#[tokio::test]
async fn test_refresh_token_stores_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("client_id=app"))
        .and(body_string_contains("refresh_token=r-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access",
            "token_type": "bearer",
            "refresh_token": "r-456",
            "expires_in": 3600,
            "scope": "api"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/taskmodels"))
        .and(header("Authorization", "Bearer new-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_listing()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.refresh_token("app", "secret", "r-123").await.unwrap();

    assert_eq!(client.token().await, "Bearer new-access");
    client.get_model_by_title("Заказ").await.unwrap();
}

#[tokio::test]
async fn test_refresh_with_empty_access_token_keeps_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "",
            "token_type": "bearer"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.refresh_token("app", "secret", "r-123").await;

    assert!(matches!(result, Err(NeaktorError::AuthError(_))));
    assert_eq!(client.token().await, TOKEN);
}

#[tokio::test]
async fn test_refresh_oauth_error_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "refresh token expired"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.refresh_token("app", "secret", "r-123").await.unwrap_err();

    assert_eq!(err.service_kind(), Some(ServiceErrorKind::Unknown));
    assert!(err.to_string().contains("refresh token expired"));
    assert_eq!(client.token().await, TOKEN);
}

#[tokio::test]
async fn test_refresh_from_config() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("client_secret=s3cr3t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "abc"})))
        .expect(1)
        .mount(&server)
        .await;

    let config = NeaktorConfig {
        api_token: None,
        oauth: Some(OAuthCredentials {
            client_id: "app".to_string(),
            client_secret: "s3cr3t".to_string(),
            refresh_token: "r-123".to_string(),
        }),
        ..config_for(&server)
    };
    let client = NeaktorClient::from_config(config).unwrap();

    assert_eq!(client.token().await, "");
    client.refresh_from_config().await.unwrap();
    assert_eq!(client.token().await, "Bearer abc");
}

#[tokio::test]
async fn test_pluggable_http_client() {
    let server = MockServer::start().await;
    mount_model_listing(&server).await;

    let http_client = reqwest::Client::builder()
        .user_agent("neaktor-tests")
        .build()
        .unwrap();
    let client = NeaktorClient::with_http_client(config_for(&server), http_client).unwrap();

    assert!(client.get_model_by_title("Клиент").await.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_model_lookups_share_one_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/taskmodels"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(model_listing())
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let lookups: Vec<_> = (0..8)
        .map(|i| {
            let client = client.clone();
            let (title, expected) = if i % 2 == 0 { ("Заказ", "m-order") } else { ("Клиент", "m-client") };
            tokio::spawn(async move {
                let model = client.get_model_by_title(title).await.unwrap();
                assert_eq!(model.id(), expected);
            })
        })
        .collect();

    for lookup in lookups {
        lookup.await.unwrap();
    }

    assert_eq!(client.cached_model_count().await, 2);
}

#[tokio::test]
async fn test_rate_limit_spent_only_on_network_calls() {
    let server = MockServer::start().await;
    mount_model_listing(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/tasks/15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = NeaktorConfig {
        calls_per_minute: 1,
        ..config_for(&server)
    };
    let client = NeaktorClient::from_config(config).unwrap();
    let model = client.get_model_by_title("Заказ").await.unwrap();

    // cache: nenhuma unidade consumida
    let cached = tokio::time::timeout(Duration::from_secs(2), client.get_model_by_title("Заказ")).await;
    assert!(cached.unwrap().is_ok());

    // rede: aguarda a próxima unidade do limiter
    let remote = tokio::time::timeout(Duration::from_millis(500), model.get_task_by_id(15)).await;
    assert!(remote.is_err());
}
