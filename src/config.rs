// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        DashboardRepository, EnergyRepository, EnvironmentalRepository, InventoryRepository, OrganizationRepository,
        PeriodRepository, UserRepository,
    },
    services::{
        mailer::{LogMailer, Mailer, SmtpMailer},
        AuthService, DashboardService, DocumentService, EnergyService, EnvironmentalService, ExportService,
        InventoryService, OrganizationService, PeriodService, UserService,
    },
};

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub smtp: Option<SmtpConfig>,
    pub fonts_dir: String,
    /// Credenciales del primer administrador (`ADMIN_EMAIL` / `ADMIN_PASSWORD`).
    pub bootstrap_admin: Option<(String, String)>,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL debe estar definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET debe estar definido")?;
        let db_max_connections = var_or("DB_MAX_CONNECTIONS", "5")
            .parse()
            .context("DB_MAX_CONNECTIONS debe ser un número")?;

        let smtp = match env::var("SMTP_HOST") {
            Ok(host) => Some(SmtpConfig {
                host,
                user: var_or("SMTP_USER", ""),
                password: var_or("SMTP_PASSWORD", ""),
                from: env::var("MAIL_FROM").context("MAIL_FROM es obligatoria si SMTP_HOST está definida")?,
            }),
            Err(_) => None,
        };

        let bootstrap_admin = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some((email, password)),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000"),
            db_max_connections,
            smtp,
            fonts_dir: var_or("FONTS_DIR", "./fonts"),
            bootstrap_admin,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: I18nStore,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub organization_service: OrganizationService,
    pub energy_service: EnergyService,
    pub period_service: PeriodService,
    pub inventory_service: InventoryService,
    pub environmental_service: EnvironmentalService,
    pub dashboard_service: DashboardService,
    pub export_service: ExportService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexión con la base de datos establecida");

        let mailer: Arc<dyn Mailer> = match &config.smtp {
            Some(smtp) => {
                tracing::info!("📧 Correo vía SMTP ({})", smtp.host);
                Arc::new(SmtpMailer::new(&smtp.host, &smtp.user, &smtp.password, &smtp.from)?)
            }
            None => {
                tracing::warn!("📧 SMTP_HOST no definida; los correos solo se registran en el log");
                Arc::new(LogMailer)
            }
        };

        let i18n_store = I18nStore::load()?;
        Ok(Self::build(db_pool, config, mailer, i18n_store))
    }

    /// Arma el grafo de dependencias sobre un pool ya creado.
    pub fn build(db_pool: PgPool, config: &Config, mailer: Arc<dyn Mailer>, i18n_store: I18nStore) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let org_repo = OrganizationRepository::new(db_pool.clone());
        let energy_repo = EnergyRepository::new(db_pool.clone());
        let period_repo = PeriodRepository::new(db_pool.clone());
        let inventory_repo = InventoryRepository::new(db_pool.clone());
        let environmental_repo = EnvironmentalRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            org_repo.clone(),
            energy_repo.clone(),
            mailer.clone(),
            config.jwt_secret.clone(),
            db_pool.clone(),
        );
        let user_service = UserService::new(user_repo.clone(), org_repo.clone(), mailer.clone(), db_pool.clone());
        let organization_service = OrganizationService::new(org_repo.clone());
        let energy_service = EnergyService::new(energy_repo.clone());
        let period_service = PeriodService::new(period_repo.clone(), user_repo, mailer, db_pool.clone());
        let inventory_service = InventoryService::new(inventory_repo, period_repo, organization_service.clone());
        let environmental_service = EnvironmentalService::new(environmental_repo);
        let dashboard_service = DashboardService::new(
            dashboard_repo,
            energy_repo,
            org_repo,
            period_service.clone(),
            inventory_service.clone(),
        );

        Self {
            db_pool,
            i18n_store,
            auth_service,
            user_service,
            organization_service,
            energy_service,
            period_service,
            inventory_service,
            environmental_service,
            dashboard_service,
            export_service: ExportService::new(),
            document_service: DocumentService::new(config.fonts_dir.clone()),
        }
    }
}
