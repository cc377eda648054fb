// src/config.rs

use std::sync::Arc;

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        AppointmentRepository, BillingRepository, NotificationRepository, ProfileRepository,
        UserRepository,
    },
    services::{
        appointment_service::AppointmentService,
        auth::AuthService,
        billing_service::BillingService,
        document_service::DocumentService,
        email::{EmailNotifier, LoggingEmailNotifier},
        notification_service::NotificationService,
    },
    ws::presence::PresenceRegistry,
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub appointment_service: AppointmentService,
    pub document_service: DocumentService,
    pub billing_repo: BillingRepository,
    pub profile_repo: ProfileRepository,
    pub notification_repo: NotificationRepository,
    pub appointment_repo: AppointmentRepository,
    // Uma única instância de presença por processo, criada aqui e nunca
    // exposta fora de register/unregister/lookup
    pub presence: PresenceRegistry,
}

impl AppState {
    // A assinatura retorna um Result: se a configuração falhar, quem decide é o main
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let profile_repo = ProfileRepository::new(db_pool.clone());
        let appointment_repo = AppointmentRepository::new(db_pool.clone());
        let billing_repo = BillingRepository::new(db_pool.clone());
        let notification_repo = NotificationRepository::new(db_pool.clone());

        let presence = PresenceRegistry::new();

        let auth_service = AuthService::new(
            user_repo.clone(),
            profile_repo.clone(),
            jwt_secret,
            db_pool.clone(),
        );

        let notification_service = NotificationService::new(
            notification_repo.clone(),
            user_repo.clone(),
            presence.clone(),
        );

        let email_notifier: Arc<dyn EmailNotifier> = Arc::new(LoggingEmailNotifier);

        let billing_service = BillingService::new(
            billing_repo.clone(),
            profile_repo.clone(),
            user_repo.clone(),
            notification_service.clone(),
            email_notifier,
        );

        let appointment_service = AppointmentService::new(
            db_pool.clone(),
            appointment_repo.clone(),
            profile_repo.clone(),
            billing_service,
            notification_service,
        );

        let document_service = DocumentService::new(billing_repo.clone());

        Ok(Self {
            db_pool,
            auth_service,
            appointment_service,
            document_service,
            billing_repo,
            profile_repo,
            notification_repo,
            appointment_repo,
            presence,
        })
    }
}
