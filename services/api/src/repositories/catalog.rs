//! Reference-data repository: car companies, car models, part categories

use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{
    CarCompany, CarModel, CarModelView, CompanyRef, PartCategory, Suggestion, SuggestionKind,
};

/// Reference-data repository
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    /// Create a new catalog repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active car companies, name ascending
    pub async fn active_companies(&self) -> Result<Vec<CarCompany>> {
        let companies = sqlx::query_as::<_, CarCompany>(
            r#"
            SELECT id, name, logo, is_active, created_at
            FROM car_companies
            WHERE is_active
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(companies)
    }

    /// Active models of one company, name ascending then newest year first
    pub async fn models_by_company(&self, company_id: Uuid) -> Result<Vec<CarModelView>> {
        let rows = sqlx::query(
            r#"
            SELECT m.id, m.name, m.year, m.variant, m.is_active, c.name AS company_name
            FROM car_models m
            JOIN car_companies c ON c.id = m.company_id
            WHERE m.company_id = $1 AND m.is_active
            ORDER BY m.name ASC, m.year DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        let models = rows
            .into_iter()
            .map(|row| CarModelView {
                id: row.get("id"),
                name: row.get("name"),
                year: row.get("year"),
                variant: row.get("variant"),
                company: CompanyRef {
                    name: row.get("company_name"),
                },
                is_active: row.get("is_active"),
            })
            .collect();

        Ok(models)
    }

    /// Active part categories, name ascending
    pub async fn active_categories(&self) -> Result<Vec<PartCategory>> {
        let categories = sqlx::query_as::<_, PartCategory>(
            r#"
            SELECT id, name, description, is_active, created_at
            FROM part_categories
            WHERE is_active
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// True if a company with this id exists
    pub async fn company_exists(&self, id: Uuid) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM car_companies WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// True if a company with this name already exists
    pub async fn company_name_exists(&self, name: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM car_companies WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// True if a category with this name already exists
    pub async fn category_name_exists(&self, name: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM part_categories WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a car company
    pub async fn create_company(&self, name: &str, logo: Option<&str>) -> Result<CarCompany> {
        let company = sqlx::query_as::<_, CarCompany>(
            r#"
            INSERT INTO car_companies (name, logo)
            VALUES ($1, $2)
            RETURNING id, name, logo, is_active, created_at
            "#,
        )
        .bind(name)
        .bind(logo)
        .fetch_one(&self.pool)
        .await?;

        Ok(company)
    }

    /// Create a car model and return it with its company name
    pub async fn create_model(
        &self,
        name: &str,
        year: i32,
        variant: Option<&str>,
        company_id: Uuid,
    ) -> Result<CarModelView> {
        let model = sqlx::query_as::<_, CarModel>(
            r#"
            INSERT INTO car_models (name, year, variant, company_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, year, variant, company_id, is_active, created_at
            "#,
        )
        .bind(name)
        .bind(year)
        .bind(variant)
        .bind(company_id)
        .fetch_one(&self.pool)
        .await?;

        let company_name: String =
            sqlx::query_scalar("SELECT name FROM car_companies WHERE id = $1")
                .bind(company_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(CarModelView {
            id: model.id,
            name: model.name,
            year: model.year,
            variant: model.variant,
            company: CompanyRef { name: company_name },
            is_active: model.is_active,
        })
    }

    /// Create a part category
    pub async fn create_category(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<PartCategory> {
        let category = sqlx::query_as::<_, PartCategory>(
            r#"
            INSERT INTO part_categories (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, is_active, created_at
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    /// Soft-deactivate a company; returns false when the id is unknown
    pub async fn deactivate_company(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("UPDATE car_companies SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Soft-deactivate a model; returns false when the id is unknown
    pub async fn deactivate_model(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("UPDATE car_models SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Soft-deactivate a category; returns false when the id is unknown
    pub async fn deactivate_category(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("UPDATE part_categories SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Typed suggestions across companies, models, and categories: up to
    /// five of each matching the term, case-insensitively
    pub async fn suggestions(&self, term: &str) -> Result<Vec<Suggestion>> {
        let pattern = format!("%{}%", term);

        let companies = sqlx::query(
            r#"
            SELECT id, name FROM car_companies
            WHERE is_active AND name ILIKE $1
            ORDER BY name ASC
            LIMIT 5
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        let models = sqlx::query(
            r#"
            SELECT m.id, m.name, c.name AS company_name
            FROM car_models m
            JOIN car_companies c ON c.id = m.company_id
            WHERE m.is_active AND m.name ILIKE $1
            ORDER BY m.name ASC
            LIMIT 5
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        let categories = sqlx::query(
            r#"
            SELECT id, name FROM part_categories
            WHERE is_active AND name ILIKE $1
            ORDER BY name ASC
            LIMIT 5
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        let mut suggestions = Vec::with_capacity(companies.len() + models.len() + categories.len());

        suggestions.extend(companies.into_iter().map(|row| Suggestion {
            kind: SuggestionKind::Company,
            name: row.get("name"),
            id: row.get("id"),
        }));
        suggestions.extend(models.into_iter().map(|row| {
            let name: String = row.get("name");
            let company: String = row.get("company_name");
            Suggestion {
                kind: SuggestionKind::Model,
                name: format!("{} ({})", name, company),
                id: row.get("id"),
            }
        }));
        suggestions.extend(categories.into_iter().map(|row| Suggestion {
            kind: SuggestionKind::Category,
            name: row.get("name"),
            id: row.get("id"),
        }));

        Ok(suggestions)
    }
}
