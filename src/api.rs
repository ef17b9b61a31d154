//! Camada HTTP para a API do Neaktor
//!
//! Toda chamada remota passa por aqui: consome uma unidade do rate limiter,
//! envia o header `Authorization` com o token atual e interpreta a resposta
//! seguindo o contrato da API:
//!
//! 1. HTTP >= 500 → [`NeaktorError::ServiceUnavailable`]
//! 2. envelope `{type, message, code, error, error_description}` com `code`
//!    não vazio → erro classificado ([`classify`])
//! 3. outros status não-2xx → erro classificado pelo próprio status HTTP
//! 4. caso contrário o corpo é desserializado no tipo esperado

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client as HttpClient, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::config::NeaktorConfig;
use crate::error::{classify, NeaktorError, Result};

/// Envelope de erro que qualquer resposta da API pode carregar
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ErrorEnvelope {
    pub type_: String,
    pub message: String,
    pub code: String,
    pub error: String,
    pub error_description: String,
}

impl ErrorEnvelope {
    /// Extrai o envelope de um corpo JSON (apenas objetos carregam envelope)
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let text = |key: &str| match object.get(key) {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Number(number)) => number.to_string(),
            _ => String::new(),
        };

        Some(Self {
            type_: text("type"),
            message: text("message"),
            code: text("code"),
            error: text("error"),
            error_description: text("error_description"),
        })
    }

    /// Mensagem mais descritiva disponível
    fn detail(&self) -> &str {
        [&self.message, &self.error_description, &self.error]
            .into_iter()
            .find(|text| !text.is_empty())
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// Gateway HTTP compartilhado entre cliente, modelos e tarefas
pub(crate) struct ApiGateway {
    http_client: HttpClient,
    api_server: String,
    oauth_url: String,
    token: RwLock<String>,
    limiter: DefaultDirectRateLimiter,
}

impl ApiGateway {
    /// Cria o gateway com um `reqwest::Client` próprio (timeouts da configuração)
    pub(crate) fn new(config: &NeaktorConfig) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| NeaktorError::config_error(format!("Failed to create HTTP client: {}", e)))?;

        Self::with_http_client(config, http_client)
    }

    /// Cria o gateway com um `reqwest::Client` fornecido pelo host
    pub(crate) fn with_http_client(config: &NeaktorConfig, http_client: HttpClient) -> Result<Self> {
        let calls_per_minute = NonZeroU32::new(config.calls_per_minute)
            .ok_or_else(|| NeaktorError::config_error("calls_per_minute deve ser maior que 0"))?;

        Ok(Self {
            http_client,
            api_server: config.api_server.trim_end_matches('/').to_string(),
            oauth_url: config.oauth_url(),
            token: RwLock::new(config.api_token.clone().unwrap_or_default()),
            limiter: RateLimiter::direct(Quota::per_minute(calls_per_minute)),
        })
    }

    pub(crate) async fn token(&self) -> String {
        self.token.read().await.clone()
    }

    pub(crate) async fn set_token(&self, token: String) {
        *self.token.write().await = token;
    }

    /// Monta o endpoint `/v1/<segmentos>` com cada segmento codificado
    fn endpoint(segments: &[&str]) -> String {
        segments
            .iter()
            .map(|segment| urlencoding::encode(segment).into_owned())
            .fold(String::from("/v1"), |path, segment| format!("{}/{}", path, segment))
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_server, endpoint)
    }

    /// Executa um GET e desserializa a resposta
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(String, String)],
    ) -> Result<T> {
        let endpoint = Self::endpoint(segments);
        let url = self.url(&endpoint);

        tracing::debug!("GET {} {:?}", url, query);

        let request = self
            .http_client
            .get(&url)
            .header("Content-Type", "application/json")
            .query(query);

        self.execute(&endpoint, request, true).await
    }

    /// Executa um POST com corpo JSON
    pub(crate) async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T> {
        let endpoint = Self::endpoint(segments);
        let url = self.url(&endpoint);
        let body = serde_json::to_vec(body)?;

        tracing::debug!("POST {} with body: {}", url, String::from_utf8_lossy(&body));

        let request = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json")
            .body(body);

        self.execute(&endpoint, request, true).await
    }

    /// Executa um PUT com corpo JSON
    pub(crate) async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T> {
        let endpoint = Self::endpoint(segments);
        let url = self.url(&endpoint);
        let body = serde_json::to_vec(body)?;

        tracing::debug!("PUT {} with body: {}", url, String::from_utf8_lossy(&body));

        let request = self
            .http_client
            .put(&url)
            .header("Content-Type", "application/json")
            .body(body);

        self.execute(&endpoint, request, true).await
    }

    /// Executa um POST form-encoded no endpoint OAuth (sem `Authorization`)
    pub(crate) async fn post_form<T: DeserializeOwned>(&self, form: &[(&str, &str)]) -> Result<T> {
        tracing::debug!("POST {} (form)", self.oauth_url);

        let request = self.http_client.post(&self.oauth_url).form(form);

        self.execute("/oauth/token", request, false).await
    }

    /// Aguarda o rate limiter e só então anexa o token atual
    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
        authorized: bool,
    ) -> Result<T> {
        self.limiter.until_ready().await;

        let request = if authorized {
            request.header("Authorization", self.token().await)
        } else {
            request
        };

        let response = request.send().await.map_err(|source| NeaktorError::Request {
            endpoint: endpoint.to_string(),
            source,
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|source| NeaktorError::Request {
            endpoint: endpoint.to_string(),
            source,
        })?;

        decode_response(endpoint, status, &body)
    }
}

/// Interpreta status + corpo de uma resposta da API
pub(crate) fn decode_response<T: DeserializeOwned>(
    endpoint: &str,
    status: StatusCode,
    body: &[u8],
) -> Result<T> {
    if status.is_server_error() {
        tracing::debug!("response status code: {}", status.as_u16());
        return Err(NeaktorError::ServiceUnavailable {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        });
    }

    let value: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        match serde_json::from_slice(body) {
            Ok(value) => value,
            // corpo não-JSON de erro HTTP: classificado abaixo pelo status
            Err(_) if !status.is_success() => Value::Null,
            Err(source) => {
                tracing::debug!(
                    "response code: {}, response body: {}",
                    status.as_u16(),
                    String::from_utf8_lossy(body)
                );
                return Err(NeaktorError::Decode {
                    endpoint: endpoint.to_string(),
                    source,
                });
            }
        }
    };

    let envelope = ErrorEnvelope::from_value(&value);

    if let Some(envelope) = envelope.as_ref().filter(|envelope| !envelope.code.is_empty()) {
        tracing::warn!(
            "⚠️ Erro da API em {} [{}]: {} {}",
            endpoint,
            envelope.type_,
            envelope.code,
            envelope.detail()
        );
        return Err(classify(&envelope.code, envelope.detail()));
    }

    if !status.is_success() {
        let message = envelope
            .as_ref()
            .map(|envelope| envelope.detail().to_string())
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());

        tracing::warn!("⚠️ Erro HTTP {} em {}: {}", status.as_u16(), endpoint, message);
        return Err(classify(status.as_str(), message));
    }

    serde_json::from_value(value).map_err(|source| NeaktorError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceErrorKind;
    use serde::de::IgnoredAny;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(calls_per_minute: u32) -> ApiGateway {
        let mut config = NeaktorConfig::with_token("t1o2k3e4n5", calls_per_minute);
        config.api_server = "https://api.neaktor.com/".to_string();
        ApiGateway::new(&config).unwrap()
    }

    #[test]
    fn test_url_is_server_plus_endpoint() {
        let api = gateway(100);
        let endpoint = ApiGateway::endpoint(&["taskmodels", "m 1", "s1", "routings"]);

        assert_eq!(api.url(&endpoint), "https://api.neaktor.com/v1/taskmodels/m%201/s1/routings");
    }

    #[tokio::test]
    async fn test_token_attached_after_rate_limit_wait() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/taskmodels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(2)
            .mount(&server)
            .await;

        let mut config = NeaktorConfig::with_token("antigo", 1);
        config.api_server = server.uri();
        let mut api = ApiGateway::new(&config).unwrap();
        api.limiter = RateLimiter::direct(Quota::with_period(Duration::from_millis(300)).unwrap());
        let api = Arc::new(api);

        let _: IgnoredAny = api.get(&["taskmodels"], &[]).await.unwrap();

        // a segunda chamada fica retida no limiter enquanto o token muda
        let pending = tokio::spawn({
            let api = Arc::clone(&api);
            async move { api.get::<IgnoredAny>(&["taskmodels"], &[]).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        api.set_token("Bearer novo".to_string()).await;
        pending.await.unwrap().unwrap();

        let tokens: Vec<String> = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|request| request.headers["authorization"].to_str().unwrap().to_string())
            .collect();
        assert_eq!(tokens, vec!["antigo", "Bearer novo"]);
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        assert_eq!(ApiGateway::endpoint(&["tasks", "15", "status", "change"]), "/v1/tasks/15/status/change");
        assert_eq!(ApiGateway::endpoint(&["customfields", "a b"]), "/v1/customfields/a%20b");
    }

    #[test]
    fn test_server_error_is_unavailable() {
        let result: Result<Value> = decode_response("/v1/tasks", StatusCode::BAD_GATEWAY, b"<html>");
        assert!(matches!(
            result,
            Err(NeaktorError::ServiceUnavailable { status: 502, .. })
        ));
    }

    #[test]
    fn test_envelope_code_is_classified() {
        let body = br#"{"type": "error", "message": "task not found", "code": "404"}"#;
        let result: Result<IgnoredAny> = decode_response("/v1/tasks/1", StatusCode::OK, body);

        let err = result.unwrap_err();
        assert_eq!(err.service_kind(), Some(ServiceErrorKind::NotFound));
        assert!(err.to_string().contains("task not found"));
    }

    #[test]
    fn test_non_success_without_code_uses_http_status() {
        let result: Result<IgnoredAny> =
            decode_response("/v1/tasks", StatusCode::TOO_MANY_REQUESTS, b"slow down");

        let err = result.unwrap_err();
        assert_eq!(err.service_kind(), Some(ServiceErrorKind::TooManyRequests));
        assert!(err.to_string().contains("slow down"));
    }

    #[test]
    fn test_empty_body_is_acknowledgement() {
        let result: Result<IgnoredAny> = decode_response("/v1/comments/1", StatusCode::OK, b"");
        assert!(result.is_ok());
    }

    #[test]
    fn test_malformed_json_is_decode_error() {
        let result: Result<Value> = decode_response("/v1/taskmodels", StatusCode::OK, b"{oops");
        assert!(matches!(result, Err(NeaktorError::Decode { .. })));
    }

    #[test]
    fn test_arrays_have_no_envelope() {
        let result: Result<Vec<u32>> = decode_response("/v1/tasks/1", StatusCode::OK, b"[1, 2]");
        assert_eq!(result.unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_envelope_numeric_code() {
        let value = serde_json::json!({"code": 429, "message": "limit"});
        let envelope = ErrorEnvelope::from_value(&value).unwrap();
        assert_eq!(envelope.code, "429");
        assert_eq!(envelope.detail(), "limit");
    }
}
