//! Configuração do cliente Neaktor
//!
//! Pode ser montada diretamente (todos os campos têm default) ou carregada de
//! variáveis de ambiente com [`NeaktorConfig::from_env`], que também lê o
//! arquivo `.env` se existir.

use std::env;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::DEFAULT_CACHE_TTL_SECS;
use crate::error::{NeaktorError, Result};

pub const DEFAULT_API_SERVER: &str = "https://api.neaktor.com";
pub const DEFAULT_CALLS_PER_MINUTE: u32 = 100;
pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_MODEL_PAGE_SIZE: usize = 100;

/// Credenciais para o refresh de token OAuth2
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NeaktorConfig {
    /// Servidor da API, sem o sufixo `/v1`
    pub api_server: String,
    /// Token estático, enviado como está no header `Authorization`
    pub api_token: Option<String>,
    pub oauth: Option<OAuthCredentials>,
    /// Orçamento de chamadas remotas por minuto
    pub calls_per_minute: u32,
    /// Tamanho de página das listagens de tarefas
    pub page_size: usize,
    /// Tamanho de página da listagem de modelos (uma única página é lida)
    pub model_page_size: usize,
    pub cache_ttl_secs: u64,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for NeaktorConfig {
    fn default() -> Self {
        Self {
            api_server: DEFAULT_API_SERVER.to_string(),
            api_token: None,
            oauth: None,
            calls_per_minute: DEFAULT_CALLS_PER_MINUTE,
            page_size: DEFAULT_PAGE_SIZE,
            model_page_size: DEFAULT_MODEL_PAGE_SIZE,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            timeout_secs: 30,
            connect_timeout_secs: 5,
        }
    }
}

impl NeaktorConfig {
    /// Configuração com token estático e orçamento de chamadas
    pub fn with_token(api_token: impl Into<String>, calls_per_minute: u32) -> Self {
        Self {
            api_token: Some(api_token.into()),
            calls_per_minute,
            ..Self::default()
        }
    }

    /// Carrega as configurações das variáveis de ambiente
    ///
    /// Variáveis lidas:
    /// - `NEAKTOR_API_SERVER`
    /// - `NEAKTOR_API_TOKEN`
    /// - `NEAKTOR_CLIENT_ID`, `NEAKTOR_CLIENT_SECRET`, `NEAKTOR_REFRESH_TOKEN`
    /// - `NEAKTOR_CALLS_PER_MINUTE`, `NEAKTOR_PAGE_SIZE`, `NEAKTOR_CACHE_TTL_SECS`
    pub fn from_env() -> Result<Self> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()
                .map_err(|e| NeaktorError::config_error(format!("Erro ao carregar .env: {}", e)))?;
        }

        let mut config = Self::default();

        if let Some(server) = Self::optional_var("NEAKTOR_API_SERVER") {
            config.api_server = server;
        }
        config.api_token = Self::optional_var("NEAKTOR_API_TOKEN");

        let client_id = Self::optional_var("NEAKTOR_CLIENT_ID");
        let client_secret = Self::optional_var("NEAKTOR_CLIENT_SECRET");
        let refresh_token = Self::optional_var("NEAKTOR_REFRESH_TOKEN");
        if let (Some(client_id), Some(client_secret), Some(refresh_token)) =
            (client_id, client_secret, refresh_token)
        {
            config.oauth = Some(OAuthCredentials {
                client_id,
                client_secret,
                refresh_token,
            });
        }

        if let Some(value) = Self::optional_var("NEAKTOR_CALLS_PER_MINUTE") {
            config.calls_per_minute = Self::parse_var("NEAKTOR_CALLS_PER_MINUTE", &value)?;
        }
        if let Some(value) = Self::optional_var("NEAKTOR_PAGE_SIZE") {
            config.page_size = Self::parse_var("NEAKTOR_PAGE_SIZE", &value)?;
        }
        if let Some(value) = Self::optional_var("NEAKTOR_CACHE_TTL_SECS") {
            config.cache_ttl_secs = Self::parse_var("NEAKTOR_CACHE_TTL_SECS", &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Valida a configuração antes de construir o cliente
    pub fn validate(&self) -> Result<()> {
        if self.api_server.trim().is_empty() {
            return Err(NeaktorError::config_error("api_server não pode ser vazio"));
        }
        if self.calls_per_minute == 0 {
            return Err(NeaktorError::config_error("calls_per_minute deve ser maior que 0"));
        }
        if self.page_size == 0 || self.model_page_size == 0 {
            return Err(NeaktorError::config_error("page_size deve ser maior que 0"));
        }

        let has_token = self
            .api_token
            .as_deref()
            .is_some_and(|token| !token.trim().is_empty());
        if !has_token && self.oauth.is_none() {
            return Err(NeaktorError::config_error(
                "configure NEAKTOR_API_TOKEN ou as credenciais OAuth (client id/secret/refresh token)",
            ));
        }

        Ok(())
    }

    /// URL base do gateway (`{api_server}/v1`)
    pub fn gateway_url(&self) -> String {
        format!("{}/v1", self.api_server.trim_end_matches('/'))
    }

    /// URL do endpoint de token OAuth2
    pub fn oauth_url(&self) -> String {
        format!("{}/oauth/token", self.api_server.trim_end_matches('/'))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    fn optional_var(key: &str) -> Option<String> {
        env::var(key).ok().filter(|value| !value.trim().is_empty())
    }

    fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
        value
            .trim()
            .parse()
            .map_err(|_| NeaktorError::config_error(format!("{} inválido: '{}'", key, value)))
    }
}
