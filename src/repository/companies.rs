//! Companies, subscriptions and services

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::CompanyStore;
use crate::{
    error::{AppError, AppResult},
    models::{Company, Service, SubscriptionStatus},
};

#[derive(Clone)]
pub struct CompaniesRepository {
    pool: Pool<Postgres>,
}

impl CompaniesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyStore for CompaniesRepository {
    async fn get_company(&self, id: Uuid) -> AppResult<Company> {
        sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, active, subscription_status, subscription_end_date
            FROM companies WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company {} not found", id)))
    }

    async fn get_service(&self, id: Uuid) -> AppResult<Service> {
        sqlx::query_as::<_, Service>(
            "SELECT id, company_id, name, duration_minutes, active FROM services WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Service {} not found", id)))
    }

    async fn expire_subscriptions(&self, today: NaiveDate) -> AppResult<u64> {
        let expirable: Vec<&str> = SubscriptionStatus::EXPIRABLE
            .iter()
            .map(SubscriptionStatus::as_str)
            .collect();

        let result = sqlx::query(
            r#"
            UPDATE companies
            SET subscription_status = $1, active = FALSE
            WHERE subscription_status = ANY($2)
              AND subscription_end_date < $3
            "#,
        )
        .bind(SubscriptionStatus::EXPIRED)
        .bind(&expirable)
        .bind(today)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
