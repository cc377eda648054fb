// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProfileRepository, UserRepository},
    models::auth::{Claims, RegisterUserPayload, Role, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    profile_repo: ProfileRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        profile_repo: ProfileRepository,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, profile_repo, jwt_secret, pool }
    }

    /// Cria o usuário e o perfil tipado do papel dele na mesma transação.
    pub async fn register_user(&self, payload: &RegisterUserPayload) -> Result<String, AppError> {
        // 1. Hashing (fora da transação, pois não toca no banco)
        let password_clone = payload.password.clone();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        // 2. Cria o usuário com o papel escolhido
        let new_user = self
            .user_repo
            .create_user(&mut *tx, &payload.email, &hashed_password, payload.role)
            .await?; // Se falhar aqui, o tx sofre rollback automático ao sair do escopo (drop)

        // 3. Cria o perfil da tabela correspondente ao papel.
        //    O despacho é o enum fechado: cada variante sabe sua tabela.
        match payload.role {
            Role::Professional => {
                self.profile_repo
                    .create_professional(
                        &mut *tx,
                        new_user.id,
                        &payload.full_name,
                        payload.specialty.as_deref(),
                    )
                    .await?;
            }
            Role::Patient => {
                self.profile_repo
                    .create_patient(&mut *tx, new_user.id, &payload.full_name, payload.company_id)
                    .await?;
            }
            Role::Company => {
                self.profile_repo
                    .create_company(&mut *tx, new_user.id, &payload.full_name)
                    .await?;
            }
            // Admin não tem tabela de perfil própria
            Role::Admin => {}
        }

        // 4. Se chegou aqui, deu tudo certo. "Commita" a transação.
        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        // 5. Gera o token (não precisa de transação de banco)
        self.create_token(new_user.id)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
