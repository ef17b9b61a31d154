//! Cliente tipado da API do Neaktor
//!
//! Este crate expõe modelos de tarefa, status, campos e tarefas do Neaktor
//! como tipos Rust, com:
//!
//! - Resolução de nomes legíveis ("Заказ", "новый заказ") para IDs do servidor
//! - Cache com TTL (30 minutos por padrão) de modelos, opções de campos
//!   personalizados e responsáveis por status
//! - Listagem paginada de tarefas com filtros por status e por campo
//! - Rate limiting de todas as chamadas remotas (chamadas por minuto)
//! - Refresh de token OAuth2
//!
//! # Endpoints
//!
//! - **Modelos**: `GET /v1/taskmodels`
//! - **Tarefas**: `GET /v1/tasks`, `GET|PUT /v1/tasks/{id}`, `POST /v1/tasks/{modelId}`
//! - **Status**: `POST /v1/tasks/{id}/status/change`
//! - **Comentários**: `POST /v1/comments/{id}`
//! - **Campos personalizados**: `GET /v1/customfields/{id}`
//! - **Roteamento**: `GET /v1/taskmodels/{modelId}/{statusId}/routings`
//!
//! # Exemplo Básico
//!
//! ```rust,ignore
//! use neaktor::{NeaktorClient, NeaktorConfig, TaskField};
//!
//! #[tokio::main]
//! async fn main() -> neaktor::Result<()> {
//!     // IMPORTANTE: ler credenciais do ambiente (NUNCA hardcode!)
//!     let client = NeaktorClient::from_config(NeaktorConfig::from_env()?)?;
//!
//!     let model = client.get_model_by_title("Заказ").await?;
//!     let status = model.get_status("новый заказ")?;
//!     let email = model.get_field("email")?;
//!
//!     let filter = TaskField::new(email.clone(), "admin@gmail.com");
//!     for task in model.get_tasks_by_status_and_fields(&status, &[filter]).await? {
//!         println!("{} {:?}", task.idx(), task.get_field(&email)?.value);
//!         task.add_comment("processado").await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

mod api;

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod matching;
pub mod model;
pub mod tasks;
pub mod types;

// Re-exports principais
pub use client::NeaktorClient;
pub use config::{NeaktorConfig, OAuthCredentials};
pub use error::{classify, NeaktorError, Result, ServiceErrorKind};
pub use model::Model;
pub use tasks::Task;
pub use types::{CurrencyValue, FieldValue, ModelAssignee, ModelField, ModelStatus, TaskField};
