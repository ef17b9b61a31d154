//! Tipos da API do Neaktor
//!
//! - **ModelField / ModelStatus**: definições estáticas de um modelo de tarefa
//! - **ModelAssignee**: responsável elegível para um status (routing)
//! - **FieldValue**: valor dinâmico de um campo de tarefa
//! - **TaskField**: instância de campo anexada a uma tarefa
//!
//! ## ⚠️ Notas Importantes
//!
//! - **IDs de modelo/status/campo**: strings opacas do servidor
//! - **IDs de tarefa**: inteiros; o `idx` é apenas o código exibido ao usuário
//! - **Datas**: formato `DD-MM-YYYYTHH:MM:SS`, sem timezone

pub mod field_value;
pub mod model;
pub mod task_field;

pub use field_value::{CurrencyValue, FieldValue};
pub use model::{ModelAssignee, ModelField, ModelStatus};
pub use task_field::TaskField;
