//! Tipos de erro para o crate neaktor

use std::fmt;

use thiserror::Error;

/// Categoria de erro reportada pela API do Neaktor no campo `code` do envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceErrorKind {
    Forbidden,
    NotFound,
    UnprocessableEntity,
    TooManyRequests,
    InternalServerError,
    Unknown,
}

impl ServiceErrorKind {
    const KNOWN: [ServiceErrorKind; 5] = [
        ServiceErrorKind::Forbidden,
        ServiceErrorKind::NotFound,
        ServiceErrorKind::UnprocessableEntity,
        ServiceErrorKind::TooManyRequests,
        ServiceErrorKind::InternalServerError,
    ];

    /// Código numérico do erro (`None` para `Unknown`)
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Forbidden => Some("403"),
            Self::NotFound => Some("404"),
            Self::UnprocessableEntity => Some("422"),
            Self::TooManyRequests => Some("429"),
            Self::InternalServerError => Some("500"),
            Self::Unknown => None,
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::UnprocessableEntity => "UNPROCESSABLE_ENTITY",
            Self::TooManyRequests => "TOO_MANY_REQUESTS",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Converte o `code` do envelope de erro em uma categoria.
    ///
    /// Aceita (sem diferenciar maiúsculas/minúsculas) o código numérico (`"404"`),
    /// a forma longa (`"404 NOT_FOUND"`) e apenas o nome (`"NOT_FOUND"`).
    /// Qualquer outro valor resulta em `Unknown`.
    pub fn from_code(code: &str) -> Self {
        let code = code.trim();

        Self::KNOWN
            .into_iter()
            .find(|kind| {
                let numeric = kind.code().unwrap_or_default();
                code.eq_ignore_ascii_case(numeric)
                    || code.eq_ignore_ascii_case(kind.reason())
                    || code.eq_ignore_ascii_case(&format!("{} {}", numeric, kind.reason()))
            })
            .unwrap_or(Self::Unknown)
    }
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code() {
            Some(code) => write!(f, "{} {}", code, self.reason()),
            None => write!(f, "{}", self.reason()),
        }
    }
}

/// Erros do cliente Neaktor
#[derive(Debug, Error)]
pub enum NeaktorError {
    /// Falha de rede/IO ao executar a requisição
    #[error("Falha na requisição {endpoint}: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Servidor respondeu com HTTP >= 500
    #[error("Serviço indisponível em {endpoint}, código: {status}")]
    ServiceUnavailable { endpoint: String, status: u16 },

    /// Corpo da resposta não é um JSON válido para o tipo esperado
    #[error("Falha ao decodificar resposta de {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// Falha ao serializar o corpo da requisição
    #[error("Falha ao serializar requisição: {0}")]
    Encode(#[from] serde_json::Error),

    /// Erro classificado a partir do envelope de erro da API
    #[error("{kind}: {message}")]
    Service {
        kind: ServiceErrorKind,
        message: String,
    },

    #[error("Modelo não encontrado: {0}")]
    ModelNotFound(String),

    #[error("Status do modelo não encontrado: {0}")]
    StatusNotFound(String),

    #[error("Campo do modelo não encontrado: {0}")]
    FieldNotFound(String),

    #[error("Tarefa não encontrada: {0}")]
    TaskNotFound(i64),

    #[error("Campo não encontrado na tarefa: {0}")]
    TaskFieldNotFound(String),

    #[error("Opção do campo personalizado {field_id} não encontrada para o valor '{value}'")]
    CustomFieldOptionNotFound { field_id: String, value: String },

    #[error("Valor do campo personalizado {field_id} não encontrado para a opção '{option_id}'")]
    CustomFieldValueNotFound { field_id: String, option_id: String },

    #[error("Responsável '{name}' não encontrado para o status {status_id}")]
    AssigneeNotFound { status_id: String, name: String },

    /// Token de acesso ausente após o refresh OAuth
    #[error("Erro de autenticação: {0}")]
    AuthError(String),

    /// Data de tarefa fora do formato `DD-MM-YYYYTHH:MM:SS`
    #[error("Falha ao interpretar data '{value}' do campo {field}: {reason}")]
    DateParse {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuração inválida: {0}")]
    ConfigError(String),
}

impl NeaktorError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn auth_error(msg: impl Into<String>) -> Self {
        Self::AuthError(msg.into())
    }

    /// Categoria do erro de serviço, se este erro veio do envelope da API
    pub fn service_kind(&self) -> Option<ServiceErrorKind> {
        match self {
            Self::Service { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// `true` para qualquer variante de "não encontrado", local ou remota
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Service {
                kind: ServiceErrorKind::NotFound,
                ..
            } | Self::ModelNotFound(_)
                | Self::StatusNotFound(_)
                | Self::FieldNotFound(_)
                | Self::TaskNotFound(_)
                | Self::TaskFieldNotFound(_)
                | Self::CustomFieldOptionNotFound { .. }
                | Self::CustomFieldValueNotFound { .. }
                | Self::AssigneeNotFound { .. }
        )
    }
}

/// Classifica o `code` do envelope de erro da API.
///
/// Função total: códigos desconhecidos viram `ServiceErrorKind::Unknown`.
pub fn classify(code: &str, message: impl Into<String>) -> NeaktorError {
    NeaktorError::Service {
        kind: ServiceErrorKind::from_code(code),
        message: message.into(),
    }
}

/// Tipo Result padrão para o crate
pub type Result<T> = std::result::Result<T, NeaktorError>;
