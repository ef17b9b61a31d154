//! Definições estáticas de um modelo de tarefa (task-model)

use serde::{Deserialize, Serialize};

/// Campo de um modelo de tarefa
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelField {
    pub id: String,
    pub name: String,
    pub state: String,
}

impl ModelField {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            state: String::new(),
        }
    }
}

/// Status do fluxo de um modelo de tarefa
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelStatus {
    pub id: String,
    pub name: String,
    pub closed: bool,
    /// Tipo do status
    #[serde(rename = "type")]
    pub type_: String,
}

impl ModelStatus {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            closed: false,
            type_: String::new(),
        }
    }

    /// `true` para o status vazio usado quando a tarefa tem um status
    /// que não existe no modelo
    pub fn is_unresolved(&self) -> bool {
        self.id.is_empty()
    }
}

impl std::fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Responsável (usuário ou papel) que pode receber uma tarefa em um status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAssignee {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_deserialize_type_field() {
        let status: ModelStatus = serde_json::from_str(
            r#"{"id": "s1", "name": "новый заказ", "closed": false, "type": "OPEN"}"#,
        )
        .unwrap();

        assert_eq!(status.id, "s1");
        assert_eq!(status.type_, "OPEN");
        assert_eq!(status.to_string(), "новый заказ");
    }

    #[test]
    fn test_partial_entries_deserialize() {
        let status: ModelStatus = serde_json::from_str(r#"{"id": "s1"}"#).unwrap();
        assert_eq!(status, ModelStatus::new("s1", ""));

        let field: ModelField = serde_json::from_str(r#"{"name": "email"}"#).unwrap();
        assert_eq!(field, ModelField::new("", "email"));
    }

    #[test]
    fn test_default_status_is_unresolved() {
        assert!(ModelStatus::default().is_unresolved());
        assert!(!ModelStatus::new("s1", "x").is_unresolved());
    }

    #[test]
    fn test_assignee_deserialize() {
        let assignee: ModelAssignee =
            serde_json::from_str(r#"{"id": 42, "name": "Иван", "type": "USER"}"#).unwrap();
        assert_eq!(assignee.id, 42);
        assert_eq!(assignee.type_, "USER");
    }
}
