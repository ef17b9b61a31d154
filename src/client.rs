//! Cliente principal da API do Neaktor

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::Mutex;

use crate::api::ApiGateway;
use crate::cache::TtlCache;
use crate::config::NeaktorConfig;
use crate::error::{classify, NeaktorError, Result};
use crate::model::Model;
use crate::types::{ModelField, ModelStatus};

/// Item da listagem `GET /taskmodels`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TaskModelData {
    id: String,
    name: String,
    fields: Vec<ModelField>,
    statuses: Vec<ModelStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TaskModelListing {
    data: Vec<TaskModelData>,
    page: usize,
    size: usize,
    total: usize,
}

/// Resposta do endpoint `/oauth/token`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TokenResponse {
    access_token: String,
    token_type: String,
    refresh_token: String,
    expires_in: i64,
    scope: String,
    error: String,
    error_description: String,
}

/// Cliente para a API do Neaktor
///
/// Mantém o token de acesso, o orçamento de chamadas por minuto e o cache
/// `título → Model`. Clonar o cliente é barato: todas as cópias compartilham
/// o mesmo gateway e o mesmo cache.
#[derive(Clone)]
pub struct NeaktorClient {
    api: Arc<ApiGateway>,
    config: Arc<NeaktorConfig>,
    models: Arc<Mutex<TtlCache<String, Arc<Model>>>>,
}

impl NeaktorClient {
    /// Cria um cliente com token estático
    ///
    /// # Argumentos
    ///
    /// * `api_token` - Token enviado como está no header `Authorization`
    /// * `calls_per_minute` - Orçamento de chamadas remotas por minuto
    pub fn new(api_token: impl Into<String>, calls_per_minute: u32) -> Result<Self> {
        Self::from_config(NeaktorConfig::with_token(api_token, calls_per_minute))
    }

    /// Cria um cliente a partir da configuração completa
    pub fn from_config(config: NeaktorConfig) -> Result<Self> {
        config.validate()?;
        let api = ApiGateway::new(&config)?;
        Ok(Self::assemble(api, config))
    }

    /// Cria um cliente usando um `reqwest::Client` já configurado pelo host
    /// (proxy, TLS, timeouts próprios)
    pub fn with_http_client(config: NeaktorConfig, http_client: reqwest::Client) -> Result<Self> {
        config.validate()?;
        let api = ApiGateway::with_http_client(&config, http_client)?;
        Ok(Self::assemble(api, config))
    }

    fn assemble(api: ApiGateway, config: NeaktorConfig) -> Self {
        tracing::info!(
            "🚀 Cliente Neaktor criado: {} ({} chamadas/min)",
            config.gateway_url(),
            config.calls_per_minute
        );

        Self {
            api: Arc::new(api),
            models: Arc::new(Mutex::new(TtlCache::new(config.cache_ttl()))),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &NeaktorConfig {
        &self.config
    }

    /// Token atualmente enviado no header `Authorization`
    pub async fn token(&self) -> String {
        self.api.token().await
    }

    /// Troca um refresh token OAuth2 por um novo token de acesso
    ///
    /// Em caso de sucesso o cliente passa a enviar `Bearer <access_token>`.
    /// Em qualquer falha o token atual é mantido.
    pub async fn refresh_token(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<()> {
        tracing::info!("🔄 Renovando token OAuth2");

        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
        ];

        let response: TokenResponse = self.api.post_form(&form).await?;

        if !response.error.is_empty() {
            tracing::warn!("⚠️ Refresh OAuth recusado: {}", response.error);
            return Err(classify(&response.error, response.error_description));
        }

        if response.access_token.is_empty() {
            tracing::error!("❌ Refresh OAuth sem access_token");
            return Err(NeaktorError::auth_error("API token incorrect"));
        }

        tracing::debug!(
            "token_type={}, expires_in={}, scope={}, refresh_token rotacionado={}",
            response.token_type,
            response.expires_in,
            response.scope,
            !response.refresh_token.is_empty()
        );

        self.api
            .set_token(format!("Bearer {}", response.access_token))
            .await;

        tracing::info!("✅ Token OAuth2 renovado");
        Ok(())
    }

    /// Renova o token usando as credenciais OAuth da configuração
    pub async fn refresh_from_config(&self) -> Result<()> {
        let oauth = self
            .config
            .oauth
            .as_ref()
            .ok_or_else(|| NeaktorError::config_error("credenciais OAuth não configuradas"))?;

        self.refresh_token(&oauth.client_id, &oauth.client_secret, &oauth.refresh_token)
            .await
    }

    /// Busca um modelo de tarefa pelo nome exato
    ///
    /// Um modelo em cache e dentro do TTL é retornado sem chamada remota.
    /// Caso contrário a listagem `/taskmodels` é lida uma vez e todos os
    /// modelos listados são colocados em cache.
    pub async fn get_model_by_title(&self, title: &str) -> Result<Arc<Model>> {
        let mut models = self.models.lock().await;

        if let Some(model) = models.get_fresh(title).cloned() {
            tracing::debug!("🎯 Modelo '{}' encontrado em cache", title);
            return Ok(model);
        }

        let query = [("size".to_string(), self.config.model_page_size.to_string())];
        let listing: TaskModelListing = self.api.get(&["taskmodels"], &query).await?;

        tracing::info!(
            "📋 {} modelos carregados (página {}, tamanho {}, total {})",
            listing.data.len(),
            listing.page,
            listing.size,
            listing.total
        );

        let mut found = None;
        for item in listing.data {
            let model = Arc::new(Model::new(
                Arc::clone(&self.api),
                item.id,
                item.name.clone(),
                item.statuses,
                item.fields,
                self.config.page_size,
                self.config.cache_ttl(),
            ));

            if item.name == title {
                found = Some(Arc::clone(&model));
            }
            models.insert(item.name, model);
        }

        found.ok_or_else(|| NeaktorError::ModelNotFound(title.to_string()))
    }

    /// Descarta todos os modelos em cache
    pub async fn invalidate_models(&self) {
        self.models.lock().await.clear();
        tracing::info!("🗑️ Cache de modelos limpo");
    }

    /// Quantidade de modelos em cache (vencidos ou não)
    pub async fn cached_model_count(&self) -> usize {
        self.models.lock().await.len()
    }
}

impl std::fmt::Debug for NeaktorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeaktorClient")
            .field("gateway_url", &self.config.gateway_url())
            .field("calls_per_minute", &self.config.calls_per_minute)
            .finish_non_exhaustive()
    }
}
