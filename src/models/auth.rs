// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Enums (Mapeando o Postgres) ---

/// O papel do usuário é imutável durante a sessão e decide rotas e permissões.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Professional, // Psicólogo
    Patient,      // Paciente
    Company,      // Empresa conveniada
}

impl Role {
    /// Prefixo de rota do painel de cada papel no front-end.
    pub fn route_prefix(&self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Professional => "/profissional",
            Role::Patient => "/paciente",
            Role::Company => "/empresa",
        }
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub role: Role,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "maria@exemplo.com.br")]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    #[schema(example = "Patient")]
    pub role: Role,

    // Nome exibido no perfil criado junto com o usuário
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Maria da Silva")]
    pub full_name: String,

    // Apenas para psicólogos
    #[schema(example = "Terapia Cognitivo-Comportamental")]
    pub specialty: Option<String>,

    // Apenas para pacientes de convênio empresarial
    pub company_id: Option<Uuid>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_prefix_por_papel() {
        assert_eq!(Role::Admin.route_prefix(), "/admin");
        assert_eq!(Role::Professional.route_prefix(), "/profissional");
        assert_eq!(Role::Patient.route_prefix(), "/paciente");
        assert_eq!(Role::Company.route_prefix(), "/empresa");
    }
}
