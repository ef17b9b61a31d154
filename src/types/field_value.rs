//! Valores dinâmicos de campos de tarefa
//!
//! A API devolve o `value` de cada campo como qualquer escalar JSON (ou um
//! objeto, no caso de campos monetários). O enum abaixo preserva o tipo para
//! que a renderização em query string e o reenvio em payloads sigam o formato
//! esperado pelo servidor.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Valor de campo monetário
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyValue {
    pub value: f64,
    pub currency: String,
}

/// Valor de um campo de tarefa
///
/// ⚠️ A ordem das variantes importa: `untagged` tenta cada uma em sequência,
/// então `Integer` precisa vir antes de `Float` e `Json` fica por último.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Currency(CurrencyValue),
    /// Qualquer outro valor (listas, objetos desconhecidos)
    Json(JsonValue),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Representação usada nos filtros `<fieldId>=<valor>` da listagem de tarefas
    ///
    /// - strings: como estão
    /// - inteiros: decimal
    /// - floats: ponto fixo com 6 casas (`1.500000`)
    /// - booleanos: `true`/`false`
    /// - null: vazio
    pub fn to_query_value(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(value) => value.to_string(),
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => format!("{:.6}", value),
            Self::String(value) => value.clone(),
            Self::Currency(currency) => format!("{:.6}", currency.value),
            Self::Json(value) => value.to_string(),
        }
    }

    /// ID de opção de campo personalizado armazenado neste valor
    pub(crate) fn as_option_id(&self) -> Option<String> {
        match self {
            Self::String(value) => Some(value.clone()),
            Self::Integer(value) => Some(value.to_string()),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}
