use serde::Serialize;

use super::{FieldValue, ModelField};

/// Campo anexado a uma tarefa específica
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskField {
    pub model_field: ModelField,
    pub value: FieldValue,
    pub state: String,
}

impl TaskField {
    /// Cria um campo para filtros, criação ou atualização de tarefas
    pub fn new(model_field: ModelField, value: impl Into<FieldValue>) -> Self {
        Self {
            model_field,
            value: value.into(),
            state: String::new(),
        }
    }
}

/// Item `{id, value}` enviado nos payloads de criação/atualização
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct FieldPayload {
    pub id: String,
    #[serde(skip_serializing_if = "FieldValue::is_null")]
    pub value: FieldValue,
}

impl From<&TaskField> for FieldPayload {
    fn from(field: &TaskField) -> Self {
        Self {
            id: field.model_field.id.clone(),
            value: field.value.clone(),
        }
    }
}
