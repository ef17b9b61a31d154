#![allow(dead_code)]

use neaktor::{NeaktorClient, NeaktorConfig};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "t1o2k3e4n5";

/// Configuração apontando para o servidor mock
pub fn config_for(server: &MockServer) -> NeaktorConfig {
    NeaktorConfig {
        api_server: server.uri(),
        api_token: Some(TOKEN.to_string()),
        ..NeaktorConfig::default()
    }
}

pub fn client_for(server: &MockServer) -> NeaktorClient {
    NeaktorClient::from_config(config_for(server)).unwrap()
}

/// Listagem com os modelos "Заказ" e "Клиент"
pub fn model_listing() -> Value {
    json!({
        "data": [
            {
                "id": "m-order",
                "name": "Заказ",
                "createdBy": 7,
                "fields": [
                    {"id": "f-email", "name": "email", "state": "VISIBLE"},
                    {"id": "f-password", "name": "пароль", "state": "VISIBLE"},
                    {"id": "f-city", "name": "город", "state": "VISIBLE"}
                ],
                "statuses": [
                    {"id": "s-new", "name": "новый заказ", "closed": false, "type": "OPEN"},
                    {"id": "s-wrong", "name": "ошибочный заказ", "closed": true, "type": "CLOSED"}
                ],
                "startStatus": "s-new",
                "canCreateTask": true
            },
            {
                "id": "m-client",
                "name": "Клиент",
                "fields": [],
                "statuses": [{"id": "s-active", "name": "активный", "closed": false, "type": "OPEN"}]
            }
        ],
        "page": 0,
        "size": 100,
        "total": 2
    })
}

pub async fn mount_model_listing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/taskmodels"))
        .and(query_param("size", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_listing()))
        .mount(server)
        .await;
}

/// Linha de tarefa como devolvida por `/v1/tasks`
pub fn task_row(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "projectId": "p1",
        "modelId": "m-order",
        "idx": format!("З-{}", id),
        "status": status,
        "canDelete": true,
        "fields": [
            {"id": "start", "value": "01-02-2024T09:15:00", "state": "VISIBLE"},
            {"id": "end", "value": null, "state": "VISIBLE"},
            {"id": "f-email", "value": format!("user{}@gmail.com", id), "state": "VISIBLE"},
            {"id": "f-city", "value": "opt-2", "state": "VISIBLE"}
        ]
    })
}

pub fn tasks_page(ids: std::ops::Range<i64>, page: usize, total: usize, status: &str) -> Value {
    let data: Vec<Value> = ids.map(|id| task_row(id, status)).collect();
    json!({"data": data, "page": page, "size": 50, "total": total})
}
