//! Tarefas do Neaktor e suas operações de escrita

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::de::IgnoredAny;
use serde::Serialize;

use crate::error::{NeaktorError, Result};
use crate::model::Model;
use crate::types::task_field::FieldPayload;
use crate::types::{FieldValue, ModelField, ModelStatus, TaskField};

/// Datas especiais extraídas dos campos `start`, `end` e `statusClosedDate`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TaskDates {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub status_closed: Option<NaiveDateTime>,
}

#[derive(Serialize)]
struct UpdateFieldsRequest {
    fields: Vec<FieldPayload>,
}

#[derive(Serialize)]
struct UpdateStatusRequest<'a> {
    status: &'a str,
}

#[derive(Serialize)]
struct AddCommentRequest<'a> {
    text: &'a str,
}

/// Tarefa lida do servidor
///
/// Uma `Task` é um retrato do momento da leitura: as operações de escrita
/// não alteram o estado local, é preciso reler a tarefa com
/// [`Model::get_task_by_id`] para ver o resultado.
#[derive(Debug, Clone)]
pub struct Task {
    model: Arc<Model>,
    id: i64,
    idx: String,
    status: ModelStatus,
    dates: TaskDates,
    fields: Vec<TaskField>,
}

impl Task {
    pub(crate) fn new(
        model: Arc<Model>,
        id: i64,
        idx: String,
        status: ModelStatus,
        dates: TaskDates,
        fields: Vec<TaskField>,
    ) -> Self {
        Self {
            model,
            id,
            idx,
            status,
            dates,
            fields,
        }
    }

    /// ID numérico usado nos endpoints de escrita
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Código legível da tarefa (apenas exibição)
    pub fn idx(&self) -> &str {
        &self.idx
    }

    /// Status atual; `ModelStatus::default()` se o status não existe no modelo
    pub fn status(&self) -> &ModelStatus {
        &self.status
    }

    pub fn start_date(&self) -> Option<NaiveDateTime> {
        self.dates.start
    }

    pub fn end_date(&self) -> Option<NaiveDateTime> {
        self.dates.end
    }

    pub fn status_closed_date(&self) -> Option<NaiveDateTime> {
        self.dates.status_closed
    }

    pub fn fields(&self) -> &[TaskField] {
        &self.fields
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// Campo da tarefa correspondente ao campo do modelo (pelo ID)
    pub fn get_field(&self, model_field: &ModelField) -> Result<TaskField> {
        self.fields
            .iter()
            .find(|field| field.model_field.id == model_field.id)
            .cloned()
            .ok_or_else(|| NeaktorError::TaskFieldNotFound(model_field.id.clone()))
    }

    /// Como [`Task::get_field`], mas com o ID de opção armazenado trocado pelo
    /// texto exibido da opção
    pub async fn get_custom_field(&self, model_field: &ModelField) -> Result<TaskField> {
        let mut field = self.get_field(model_field)?;
        let display = self.resolve_option(model_field, &field.value).await?;

        field.value = FieldValue::String(display);
        Ok(field)
    }

    /// Texto exibido da opção selecionada em um campo de lista
    pub async fn get_custom_field_value(&self, model_field: &ModelField) -> Result<String> {
        let field = self.get_field(model_field)?;
        self.resolve_option(model_field, &field.value).await
    }

    async fn resolve_option(&self, model_field: &ModelField, value: &FieldValue) -> Result<String> {
        let option_id = value
            .as_option_id()
            .ok_or_else(|| NeaktorError::CustomFieldValueNotFound {
                field_id: model_field.id.clone(),
                option_id: value.to_query_value(),
            })?;

        self.model.get_custom_field_value(model_field, &option_id).await
    }

    /// Atualiza campos da tarefa (`PUT /tasks/{id}`), na ordem informada
    pub async fn update_fields(&self, fields: &[TaskField]) -> Result<()> {
        let request = UpdateFieldsRequest {
            fields: fields.iter().map(FieldPayload::from).collect(),
        };

        let _: IgnoredAny = self
            .model
            .api()
            .put(&["tasks", &self.id.to_string()], &request)
            .await?;

        tracing::info!("✅ {} campos atualizados na tarefa {}", fields.len(), self.id);
        Ok(())
    }

    /// Move a tarefa para outro status
    pub async fn update_status(&self, status: &ModelStatus) -> Result<()> {
        let request = UpdateStatusRequest { status: &status.id };

        let _: IgnoredAny = self
            .model
            .api()
            .post(&["tasks", &self.id.to_string(), "status", "change"], &request)
            .await?;

        tracing::info!("✅ Tarefa {} movida para '{}'", self.id, status.name);
        Ok(())
    }

    /// Adiciona um comentário de texto à tarefa
    pub async fn add_comment(&self, message: &str) -> Result<()> {
        let request = AddCommentRequest { text: message };

        let _: IgnoredAny = self
            .model
            .api()
            .post(&["comments", &self.id.to_string()], &request)
            .await?;

        tracing::info!("💬 Comentário adicionado à tarefa {}", self.id);
        Ok(())
    }
}
