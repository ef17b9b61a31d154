//! Modelo de tarefa: resolução de status/campos, caches secundários e
//! listagem paginada de tarefas

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::api::ApiGateway;
use crate::cache::TtlCache;
use crate::error::{NeaktorError, Result};
use crate::matching::{equal_fold, find_by_name};
use crate::tasks::{Task, TaskDates};
use crate::types::task_field::FieldPayload;
use crate::types::{FieldValue, ModelAssignee, ModelField, ModelStatus, TaskField};

/// Formato das datas de tarefa (`31-12-2023T18:30:00`)
pub const TASK_DATE_FORMAT: &str = "%d-%m-%YT%H:%M:%S";

const START_FIELD_ID: &str = "start";
const END_FIELD_ID: &str = "end";
const STATUS_CLOSED_DATE_FIELD_ID: &str = "statusClosedDate";

/// Opção disponível de um campo personalizado (lista de valores)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct CustomFieldOption {
    id: String,
    value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CustomFieldOptions {
    available_values: Vec<CustomFieldOption>,
}

/// Item de `GET /customfields/{id}`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CustomFieldResponse {
    id: String,
    #[serde(rename = "type")]
    type_: String,
    name: String,
    options: CustomFieldOptions,
}

/// Item de `GET /taskmodels/{modelId}/{statusId}/routings`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RoutingResponse {
    to: String,
    assignees: Vec<ModelAssignee>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TaskRowField {
    id: String,
    value: FieldValue,
    state: String,
}

/// Tarefa como devolvida por `/tasks` e `/tasks/{id}`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TaskRow {
    id: i64,
    idx: String,
    status: String,
    fields: Vec<TaskRowField>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TasksPage {
    data: Vec<TaskRow>,
    page: usize,
    size: usize,
    total: usize,
}

#[derive(Debug, Serialize)]
struct AssigneePayload {
    #[serde(skip_serializing_if = "is_zero")]
    id: i64,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    type_: String,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

#[derive(Debug, Serialize)]
struct CreateTaskRequest {
    assignee: AssigneePayload,
    fields: Vec<FieldPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CreateTaskResponse {
    id: i64,
    #[serde(rename = "projectId")]
    project_id: String,
}

/// Modelo de tarefa (task-model) do Neaktor
///
/// Status e campos são carregados uma única vez, na criação a partir da
/// listagem de modelos. As opções de campos personalizados e os
/// responsáveis por status ficam em caches com TTL próprios do modelo.
pub struct Model {
    api: Arc<ApiGateway>,
    id: String,
    name: String,
    statuses: BTreeMap<String, ModelStatus>,
    fields: BTreeMap<String, ModelField>,
    page_size: usize,
    custom_fields: Mutex<TtlCache<String, Vec<CustomFieldOption>>>,
    assignees: Mutex<TtlCache<String, Vec<ModelAssignee>>>,
}

impl Model {
    pub(crate) fn new(
        api: Arc<ApiGateway>,
        id: String,
        name: String,
        statuses: Vec<ModelStatus>,
        fields: Vec<ModelField>,
        page_size: usize,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            api,
            id,
            name,
            statuses: statuses
                .into_iter()
                .map(|status| (status.id.clone(), status))
                .collect(),
            fields: fields
                .into_iter()
                .map(|field| (field.id.clone(), field))
                .collect(),
            page_size,
            custom_fields: Mutex::new(TtlCache::new(cache_ttl)),
            assignees: Mutex::new(TtlCache::new(cache_ttl)),
        }
    }

    pub(crate) fn api(&self) -> &ApiGateway {
        &self.api
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Todos os status do modelo, indexados por ID
    pub fn all_statuses(&self) -> &BTreeMap<String, ModelStatus> {
        &self.statuses
    }

    /// Todos os campos do modelo, indexados por ID
    pub fn all_fields(&self) -> &BTreeMap<String, ModelField> {
        &self.fields
    }

    /// Busca um status pelo nome (case-insensitive)
    pub fn get_status(&self, title: &str) -> Result<ModelStatus> {
        find_by_name(self.statuses.values(), title, |status| status.name.as_str())
            .cloned()
            .ok_or_else(|| NeaktorError::StatusNotFound(title.to_string()))
    }

    /// Busca um campo pelo nome (case-insensitive)
    pub fn get_field(&self, title: &str) -> Result<ModelField> {
        find_by_name(self.fields.values(), title, |field| field.name.as_str())
            .cloned()
            .ok_or_else(|| NeaktorError::FieldNotFound(title.to_string()))
    }

    /// Busca vários status de uma vez
    ///
    /// Retorna `título → status` para os títulos encontrados; falha apenas se
    /// nenhum título for encontrado.
    pub fn get_statuses(&self, titles: &[&str]) -> Result<HashMap<String, ModelStatus>> {
        let statuses: HashMap<String, ModelStatus> = titles
            .iter()
            .filter_map(|title| {
                self.get_status(title)
                    .ok()
                    .map(|status| (title.to_string(), status))
            })
            .collect();

        if statuses.is_empty() {
            return Err(NeaktorError::StatusNotFound(titles.join(", ")));
        }

        Ok(statuses)
    }

    /// Busca vários campos de uma vez (mesma semântica de [`Model::get_statuses`])
    pub fn get_fields(&self, titles: &[&str]) -> Result<HashMap<String, ModelField>> {
        let fields: HashMap<String, ModelField> = titles
            .iter()
            .filter_map(|title| {
                self.get_field(title)
                    .ok()
                    .map(|field| (title.to_string(), field))
            })
            .collect();

        if fields.is_empty() {
            return Err(NeaktorError::FieldNotFound(titles.join(", ")));
        }

        Ok(fields)
    }

    // ==================== CAMPOS PERSONALIZADOS ====================

    /// ID da opção cujo texto é `value`
    pub async fn get_custom_field_option_id(&self, field: &ModelField, value: &str) -> Result<String> {
        self.find_custom_field_option(field, |option| option.value == value)
            .await?
            .map(|option| option.id)
            .ok_or_else(|| NeaktorError::CustomFieldOptionNotFound {
                field_id: field.id.clone(),
                value: value.to_string(),
            })
    }

    /// Texto exibido para a opção `option_id`
    pub async fn get_custom_field_value(&self, field: &ModelField, option_id: &str) -> Result<String> {
        self.find_custom_field_option(field, |option| option.id == option_id)
            .await?
            .map(|option| option.value)
            .ok_or_else(|| NeaktorError::CustomFieldValueNotFound {
                field_id: field.id.clone(),
                option_id: option_id.to_string(),
            })
    }

    /// Consulta o cache de opções do campo; se a entrada não existir, estiver
    /// vencida ou não contiver a opção, ela é removida e recarregada uma vez.
    async fn find_custom_field_option<F>(
        &self,
        field: &ModelField,
        matches: F,
    ) -> Result<Option<CustomFieldOption>>
    where
        F: Fn(&CustomFieldOption) -> bool,
    {
        let mut cache = self.custom_fields.lock().await;

        if let Some(options) = cache.get_fresh(field.id.as_str()) {
            if let Some(option) = options.iter().find(|option| matches(option)) {
                return Ok(Some(option.clone()));
            }
        }
        cache.remove(field.id.as_str());

        let responses: Vec<CustomFieldResponse> =
            self.api.get(&["customfields", &field.id], &[]).await?;

        let Some(response) = responses
            .iter()
            .find(|response| response.id == field.id)
            .or_else(|| responses.last())
        else {
            tracing::warn!("⚠️ Campo personalizado {} sem definição na resposta", field.id);
            return Ok(None);
        };

        tracing::info!(
            "🔄 Opções do campo '{}' ({}) atualizadas: {} opções",
            response.name,
            response.type_,
            response.options.available_values.len()
        );

        let options = response.options.available_values.clone();
        let found = options.iter().find(|option| matches(option)).cloned();
        cache.insert(field.id.clone(), options);

        Ok(found)
    }

    // ==================== RESPONSÁVEIS ====================

    /// Responsável chamado `name` nas regras de roteamento do status
    pub async fn get_assignee(&self, status: &ModelStatus, name: &str) -> Result<ModelAssignee> {
        let mut cache = self.assignees.lock().await;

        if let Some(assignees) = cache.get_fresh(status.id.as_str()) {
            if let Some(assignee) = assignees.iter().find(|assignee| assignee.name == name) {
                return Ok(assignee.clone());
            }
        }
        cache.remove(status.id.as_str());

        let routings: Vec<RoutingResponse> = self
            .api
            .get(&["taskmodels", &self.id, &status.id, "routings"], &[])
            .await?;

        tracing::info!(
            "🔄 Roteamentos do status '{}' atualizados: {} regras",
            status.name,
            routings.len()
        );

        let mut found = None;
        for routing in routings {
            if routing.to == status.id {
                found = routing
                    .assignees
                    .iter()
                    .find(|assignee| assignee.name == name)
                    .cloned();
            }
            cache.insert(routing.to, routing.assignees);
        }

        found.ok_or_else(|| NeaktorError::AssigneeNotFound {
            status_id: status.id.clone(),
            name: name.to_string(),
        })
    }

    // ==================== TAREFAS ====================

    pub async fn get_tasks_by_status(self: &Arc<Self>, status: &ModelStatus) -> Result<Vec<Task>> {
        self.fetch_tasks(Some(status), &[]).await
    }

    /// Busca sequencial por status; o primeiro erro interrompe a busca
    pub async fn get_tasks_by_statuses(self: &Arc<Self>, statuses: &[ModelStatus]) -> Result<Vec<Task>> {
        let mut tasks = Vec::new();

        for status in statuses {
            tasks.extend(self.fetch_tasks(Some(status), &[]).await?);
        }

        Ok(tasks)
    }

    pub async fn get_tasks_by_status_and_fields(
        self: &Arc<Self>,
        status: &ModelStatus,
        fields: &[TaskField],
    ) -> Result<Vec<Task>> {
        self.fetch_tasks(Some(status), fields).await
    }

    pub async fn get_tasks_by_fields(self: &Arc<Self>, fields: &[TaskField]) -> Result<Vec<Task>> {
        self.fetch_tasks(None, fields).await
    }

    /// Busca uma tarefa pelo ID numérico
    pub async fn get_task_by_id(self: &Arc<Self>, id: i64) -> Result<Task> {
        let rows: Vec<TaskRow> = self.api.get(&["tasks", &id.to_string()], &[]).await?;

        match rows.into_iter().next() {
            Some(row) => self.build_task(row),
            None => Err(NeaktorError::TaskNotFound(id)),
        }
    }

    /// Cria uma tarefa e a relê do servidor
    pub async fn create_task(
        self: &Arc<Self>,
        assignee: &ModelAssignee,
        fields: &[TaskField],
    ) -> Result<Task> {
        let request = CreateTaskRequest {
            assignee: AssigneePayload {
                id: assignee.id,
                type_: assignee.type_.clone(),
            },
            fields: fields.iter().map(FieldPayload::from).collect(),
        };

        let response: CreateTaskResponse = self.api.post(&["tasks", &self.id], &request).await?;

        tracing::info!(
            "✅ Tarefa {} criada no modelo '{}' (projeto {})",
            response.id,
            self.name,
            response.project_id
        );

        self.get_task_by_id(response.id).await
    }

    pub async fn is_tasks_by_status_exists(&self, status: &ModelStatus) -> Result<bool> {
        self.any_task(Some(status), &[]).await
    }

    /// Verifica os status em ordem e para no primeiro que tiver tarefas
    pub async fn is_tasks_by_statuses_exists(&self, statuses: &[ModelStatus]) -> Result<bool> {
        for status in statuses {
            if self.any_task(Some(status), &[]).await? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    pub async fn is_tasks_by_status_and_fields_exists(
        &self,
        status: &ModelStatus,
        fields: &[TaskField],
    ) -> Result<bool> {
        self.any_task(Some(status), fields).await
    }

    pub async fn is_tasks_by_fields_exists(&self, fields: &[TaskField]) -> Result<bool> {
        self.any_task(None, fields).await
    }

    /// Lê a listagem `/tasks` página a página
    ///
    /// O número de páginas começa em 1 e é recalculado após cada página com
    /// `ceil(total / page_size)`. Uma página sem itens encerra a leitura.
    async fn fetch_tasks(
        self: &Arc<Self>,
        status: Option<&ModelStatus>,
        filters: &[TaskField],
    ) -> Result<Vec<Task>> {
        let mut tasks = Vec::new();
        let mut max_pages = 1;
        let mut page = 0;

        while page < max_pages {
            let query = self.tasks_query(status, filters, self.page_size, page);
            let response: TasksPage = self.api.get(&["tasks"], &query).await?;

            tracing::debug!(
                "📄 Página {} de tarefas: {} itens (total {})",
                response.page,
                response.data.len(),
                response.total
            );

            // página vazia encerra a leitura mesmo com `total` inconsistente
            if response.data.is_empty() {
                break;
            }

            for row in response.data {
                tasks.push(self.build_task(row)?);
            }

            max_pages = response.total.div_ceil(self.page_size);
            page += 1;
        }

        tracing::info!("📋 {} tarefas carregadas do modelo '{}'", tasks.len(), self.name);
        Ok(tasks)
    }

    /// Verificação de existência com uma única requisição de tamanho 1
    async fn any_task(&self, status: Option<&ModelStatus>, filters: &[TaskField]) -> Result<bool> {
        let query = self.tasks_query(status, filters, 1, 0);
        let response: TasksPage = self.api.get(&["tasks"], &query).await?;

        tracing::debug!("size={} total={}", response.size, response.total);
        Ok(response.total > 0 || !response.data.is_empty())
    }

    /// `model_id`, `status_id`, `size`, `page` e depois `<fieldId>=<valor>`
    fn tasks_query(
        &self,
        status: Option<&ModelStatus>,
        filters: &[TaskField],
        size: usize,
        page: usize,
    ) -> Vec<(String, String)> {
        let mut query = vec![("model_id".to_string(), self.id.clone())];

        if let Some(status) = status {
            query.push(("status_id".to_string(), status.id.clone()));
        }
        query.push(("size".to_string(), size.to_string()));
        query.push(("page".to_string(), page.to_string()));

        query.extend(
            filters
                .iter()
                .map(|field| (field.model_field.id.clone(), field.value.to_query_value())),
        );

        query
    }

    fn build_task(self: &Arc<Self>, row: TaskRow) -> Result<Task> {
        let mut dates = TaskDates::default();
        let mut fields = Vec::with_capacity(row.fields.len());

        for field in row.fields {
            if equal_fold(&field.id, START_FIELD_ID) {
                dates.start = parse_task_date(&field.id, &field.value)?;
            } else if equal_fold(&field.id, END_FIELD_ID) {
                dates.end = parse_task_date(&field.id, &field.value)?;
            } else if equal_fold(&field.id, STATUS_CLOSED_DATE_FIELD_ID) {
                dates.status_closed = parse_task_date(&field.id, &field.value)?;
            }

            let model_field = self.fields.get(&field.id).cloned().unwrap_or_else(|| {
                tracing::debug!("Campo {} não pertence ao modelo '{}'", field.id, self.name);
                ModelField::new(field.id.clone(), "")
            });

            fields.push(TaskField {
                model_field,
                value: field.value,
                state: field.state,
            });
        }

        let status = self.resolve_status(&row.status, row.id);

        Ok(Task::new(Arc::clone(self), row.id, row.idx, status, dates, fields))
    }

    /// Resolve o status bruto da tarefa por ID ou por nome (case-insensitive)
    fn resolve_status(&self, raw: &str, task_id: i64) -> ModelStatus {
        self.statuses
            .values()
            .find(|status| status.id == raw || equal_fold(&status.name, raw))
            .cloned()
            .unwrap_or_else(|| {
                tracing::warn!(
                    "⚠️ Status '{}' da tarefa {} não existe no modelo '{}'",
                    raw,
                    task_id,
                    self.name
                );
                ModelStatus::default()
            })
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("statuses", &self.statuses.len())
            .field("fields", &self.fields.len())
            .finish_non_exhaustive()
    }
}

/// Interpreta uma data de tarefa; `null` significa ausente
fn parse_task_date(field_id: &str, value: &FieldValue) -> Result<Option<NaiveDateTime>> {
    let raw = match value {
        FieldValue::Null => return Ok(None),
        FieldValue::String(raw) => raw,
        other => {
            return Err(NeaktorError::DateParse {
                field: field_id.to_string(),
                value: other.to_query_value(),
                reason: "valor não é uma string".to_string(),
            })
        }
    };

    NaiveDateTime::parse_from_str(raw, TASK_DATE_FORMAT)
        .map(Some)
        .map_err(|e| NeaktorError::DateParse {
            field: field_id.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        })
}
