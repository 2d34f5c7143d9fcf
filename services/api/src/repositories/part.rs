//! Part repository: scoped listing queries, creation, and mutation
//!
//! One filter vocabulary serves the admin, shopkeeper, and customer
//! listings. The WHERE clause is assembled exactly once per request and
//! applied to both the row query and the count query, so `total` can never
//! drift from the page of results.

use std::collections::HashMap;

use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use uuid::Uuid;

use crate::models::{
    CategoryRef, CompanyRef, ModelRef, NewPart, Pagination, PartQuery, PartSort, PartUpdate,
    PartView, ShopDetails, ShopkeeperRef, ShopkeeperStats, SortOrder,
};

/// Which caller a listing runs for; the scope contributes the implicit
/// predicates the caller cannot override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartScope {
    /// Everything; the shopkeeper filter parameter is honored
    Admin,
    /// Only parts owned by this shopkeeper
    Shopkeeper(Uuid),
    /// Only parts with `availability = 'available'`
    Customer,
}

const SELECT_VIEW: &str = r#"
SELECT p.id, p.name, p.description, p.selling_price, p.purchased_price,
       p.condition, p.availability, p.warranty,
       p.location_city, p.location_state, p.contact_phone, p.contact_email,
       p.created_at,
       c.name AS company_name,
       m.name AS model_name, m.year AS model_year, m.variant AS model_variant,
       cat.name AS category_name, cat.description AS category_description,
       u.id AS shopkeeper_id, u.name AS shopkeeper_name, u.email AS shopkeeper_email,
       sp.shop_name, sp.address, sp.city, sp.state, sp.pincode
FROM parts p
JOIN car_companies c ON c.id = p.company_id
JOIN car_models m ON m.id = p.model_id
JOIN part_categories cat ON cat.id = p.category_id
JOIN users u ON u.id = p.shopkeeper_id
LEFT JOIN shopkeeper_profiles sp ON sp.user_id = u.id
"#;

/// Append the scope's implicit predicates and the caller's filters.
/// Every condition references only `p.*` columns so the same fragment
/// works for the join query and the bare count query.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, scope: PartScope, query: &PartQuery) {
    builder.push(" WHERE 1=1");

    match scope {
        PartScope::Admin => {
            if let Some(shopkeeper) = query.shopkeeper {
                builder.push(" AND p.shopkeeper_id = ").push_bind(shopkeeper);
            }
        }
        PartScope::Shopkeeper(owner) => {
            builder.push(" AND p.shopkeeper_id = ").push_bind(owner);
        }
        PartScope::Customer => {
            builder.push(" AND p.availability = 'available'");
        }
    }

    if let Some(search) = query.search.as_deref() {
        let search = search.trim();
        if !search.is_empty() {
            let pattern = format!("%{}%", search);
            builder
                .push(" AND (p.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR p.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }

    if let Some(company) = query.company {
        builder.push(" AND p.company_id = ").push_bind(company);
    }
    if let Some(model) = query.model {
        builder.push(" AND p.model_id = ").push_bind(model);
    }
    if let Some(category) = query.category {
        builder.push(" AND p.category_id = ").push_bind(category);
    }
    if let Some(condition) = query.condition {
        builder.push(" AND p.condition = ").push_bind(condition);
    }
    if scope != PartScope::Customer {
        if let Some(availability) = query.availability {
            builder.push(" AND p.availability = ").push_bind(availability);
        }
    }
    if let Some(min_price) = query.min_price {
        builder.push(" AND p.selling_price >= ").push_bind(min_price);
    }
    if let Some(max_price) = query.max_price {
        builder.push(" AND p.selling_price <= ").push_bind(max_price);
    }
    if let Some(city) = query.city.as_deref() {
        if !city.trim().is_empty() {
            builder
                .push(" AND p.location_city ILIKE ")
                .push_bind(format!("%{}%", city.trim()));
        }
    }
    if let Some(state) = query.state.as_deref() {
        if !state.trim().is_empty() {
            builder
                .push(" AND p.location_state ILIKE ")
                .push_bind(format!("%{}%", state.trim()));
        }
    }
}

fn view_from_row(row: &PgRow) -> PartView {
    let shop_details = row
        .get::<Option<String>, _>("shop_name")
        .map(|shop_name| ShopDetails {
            shop_name,
            address: row.get("address"),
            city: row.get("city"),
            state: row.get("state"),
            pincode: row.get("pincode"),
        });

    PartView {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        selling_price: row.get("selling_price"),
        purchased_price: row.get("purchased_price"),
        condition: row.get("condition"),
        availability: row.get("availability"),
        warranty: row.get("warranty"),
        images: Vec::new(),
        car_company: CompanyRef {
            name: row.get("company_name"),
        },
        car_model: ModelRef {
            name: row.get("model_name"),
            year: row.get("model_year"),
            variant: row.get("model_variant"),
        },
        category: CategoryRef {
            name: row.get("category_name"),
            description: row.get("category_description"),
        },
        location_city: row.get("location_city"),
        location_state: row.get("location_state"),
        contact_phone: row.get("contact_phone"),
        contact_email: row.get("contact_email"),
        shopkeeper: ShopkeeperRef {
            id: row.get("shopkeeper_id"),
            name: row.get("shopkeeper_name"),
            email: row.get("shopkeeper_email"),
            shop_details,
        },
        created_at: row.get("created_at"),
    }
}

/// Part repository
#[derive(Clone)]
pub struct PartRepository {
    pool: PgPool,
}

impl PartRepository {
    /// Create a new part repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One page of parts plus the total for the same predicate
    pub async fn list(
        &self,
        scope: PartScope,
        query: &PartQuery,
        pagination: Pagination,
    ) -> Result<(Vec<PartView>, i64)> {
        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM parts p");
        push_filters(&mut count_builder, scope, query);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let sort = PartSort::from_param(query.sort_by.as_deref());
        let order = SortOrder::from_param(query.sort_order.as_deref());

        let mut builder = QueryBuilder::new(SELECT_VIEW);
        push_filters(&mut builder, scope, query);
        builder.push(format_args!(" ORDER BY {} {}", sort.column(), order.sql()));
        builder.push(" LIMIT ").push_bind(pagination.limit as i64);
        builder.push(" OFFSET ").push_bind(pagination.offset());

        let rows = builder.build().fetch_all(&self.pool).await?;
        let mut views: Vec<PartView> = rows.iter().map(view_from_row).collect();
        self.attach_images(&mut views).await?;

        Ok((views, total))
    }

    /// A single part view, regardless of availability
    pub async fn get_view(&self, id: Uuid) -> Result<Option<PartView>> {
        let sql = format!("{SELECT_VIEW} WHERE p.id = $1");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        match row {
            Some(row) => {
                let mut views = vec![view_from_row(&row)];
                self.attach_images(&mut views).await?;
                Ok(views.pop())
            }
            None => Ok(None),
        }
    }

    /// The owning shopkeeper of a part, if the part exists
    pub async fn owner_of(&self, id: Uuid) -> Result<Option<Uuid>> {
        let owner = sqlx::query_scalar("SELECT shopkeeper_id FROM parts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(owner)
    }

    /// Insert a part and its image rows in one transaction
    pub async fn create(&self, new_part: &NewPart) -> Result<PartView> {
        let mut tx = self.pool.begin().await?;

        let part_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO parts (name, description, selling_price, purchased_price, condition,
                               warranty, company_id, model_id, category_id, shopkeeper_id,
                               location_city, location_state, location_pincode,
                               contact_phone, contact_email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id
            "#,
        )
        .bind(&new_part.name)
        .bind(&new_part.description)
        .bind(new_part.selling_price)
        .bind(new_part.purchased_price)
        .bind(new_part.condition)
        .bind(&new_part.warranty)
        .bind(new_part.company_id)
        .bind(new_part.model_id)
        .bind(new_part.category_id)
        .bind(new_part.shopkeeper_id)
        .bind(&new_part.location_city)
        .bind(&new_part.location_state)
        .bind(&new_part.location_pincode)
        .bind(&new_part.contact_phone)
        .bind(&new_part.contact_email)
        .fetch_one(&mut *tx)
        .await?;

        for url in &new_part.images {
            sqlx::query("INSERT INTO part_images (part_id, url) VALUES ($1, $2)")
                .bind(part_id)
                .bind(url)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get_view(part_id)
            .await?
            .context("part vanished right after insert")
    }

    /// Apply a partial update and append any new images
    pub async fn update(
        &self,
        id: Uuid,
        update: &PartUpdate,
        new_images: &[String],
    ) -> Result<PartView> {
        if !update.is_empty() {
            let mut builder = QueryBuilder::new("UPDATE parts SET updated_at = now()");
            if let Some(name) = &update.name {
                builder.push(", name = ").push_bind(name.clone());
            }
            if let Some(description) = &update.description {
                builder.push(", description = ").push_bind(description.clone());
            }
            if let Some(selling_price) = update.selling_price {
                builder.push(", selling_price = ").push_bind(selling_price);
            }
            if let Some(purchased_price) = update.purchased_price {
                builder.push(", purchased_price = ").push_bind(purchased_price);
            }
            if let Some(condition) = update.condition {
                builder.push(", condition = ").push_bind(condition);
            }
            if let Some(availability) = update.availability {
                builder.push(", availability = ").push_bind(availability);
            }
            if let Some(warranty) = &update.warranty {
                builder.push(", warranty = ").push_bind(warranty.clone());
            }
            if let Some(company_id) = update.company_id {
                builder.push(", company_id = ").push_bind(company_id);
            }
            if let Some(model_id) = update.model_id {
                builder.push(", model_id = ").push_bind(model_id);
            }
            if let Some(category_id) = update.category_id {
                builder.push(", category_id = ").push_bind(category_id);
            }
            builder.push(" WHERE id = ").push_bind(id);
            builder.build().execute(&self.pool).await?;
        }

        for url in new_images {
            sqlx::query("INSERT INTO part_images (part_id, url) VALUES ($1, $2)")
                .bind(id)
                .bind(url)
                .execute(&self.pool)
                .await?;
        }

        self.get_view(id).await?.context("part vanished during update")
    }

    /// Move a part to `sold`. Monotone and idempotent: issuing it twice
    /// converges to the same state with no error.
    pub async fn mark_sold(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE parts SET availability = 'sold', updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Per-availability counts for one shopkeeper's dashboard
    pub async fn stats_for_shopkeeper(&self, shopkeeper_id: Uuid) -> Result<ShopkeeperStats> {
        let stats = sqlx::query_as::<_, ShopkeeperStats>(
            r#"
            SELECT
                COUNT(*) AS total_parts,
                COUNT(*) FILTER (WHERE availability = 'available') AS available_parts,
                COUNT(*) FILTER (WHERE availability = 'sold') AS sold_parts,
                COUNT(*) FILTER (WHERE availability = 'reserved') AS reserved_parts
            FROM parts
            WHERE shopkeeper_id = $1
            "#,
        )
        .bind(shopkeeper_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    /// Global part counts for the admin dashboard
    pub async fn global_stats(&self) -> Result<(i64, i64, i64)> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE availability = 'available') AS available,
                COUNT(*) FILTER (WHERE availability = 'sold') AS sold
            FROM parts
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok((row.get("total"), row.get("available"), row.get("sold")))
    }

    /// Up to `limit` available parts sharing classification with the
    /// given part: same (model, category), or same (company, category).
    /// Returns None when the part itself is unknown.
    pub async fn similar(&self, id: Uuid, limit: i64) -> Result<Option<Vec<PartView>>> {
        let seed = sqlx::query("SELECT company_id, model_id, category_id FROM parts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(seed) = seed else {
            return Ok(None);
        };
        let company_id: Uuid = seed.get("company_id");
        let model_id: Uuid = seed.get("model_id");
        let category_id: Uuid = seed.get("category_id");

        let sql = format!(
            r#"{SELECT_VIEW}
            WHERE p.id <> $1
              AND p.availability = 'available'
              AND ((p.model_id = $2 AND p.category_id = $3)
                OR (p.company_id = $4 AND p.category_id = $3))
            ORDER BY p.created_at DESC
            LIMIT $5
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(id)
            .bind(model_id)
            .bind(category_id)
            .bind(company_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let mut views: Vec<PartView> = rows.iter().map(view_from_row).collect();
        self.attach_images(&mut views).await?;

        Ok(Some(views))
    }

    /// Newest available parts for the landing page
    pub async fn featured(&self, limit: i64) -> Result<Vec<PartView>> {
        let sql = format!(
            "{SELECT_VIEW} WHERE p.availability = 'available' ORDER BY p.created_at DESC LIMIT $1"
        );
        let rows = sqlx::query(&sql).bind(limit).fetch_all(&self.pool).await?;

        let mut views: Vec<PartView> = rows.iter().map(view_from_row).collect();
        self.attach_images(&mut views).await?;

        Ok(views)
    }

    async fn attach_images(&self, views: &mut [PartView]) -> Result<()> {
        if views.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = views.iter().map(|v| v.id).collect();
        // ORDER BY id keeps images in upload order (id is a sequence)
        let rows =
            sqlx::query("SELECT part_id, url FROM part_images WHERE part_id = ANY($1) ORDER BY id")
                .bind(&ids)
                .fetch_all(&self.pool)
                .await?;

        let mut by_part: HashMap<Uuid, Vec<String>> = HashMap::new();
        for row in rows {
            by_part
                .entry(row.get("part_id"))
                .or_default()
                .push(row.get("url"));
        }

        for view in views {
            view.images = by_part.remove(&view.id).unwrap_or_default();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Availability;

    fn filter_sql(scope: PartScope, query: &PartQuery) -> String {
        let mut builder = QueryBuilder::new("");
        push_filters(&mut builder, scope, query);
        builder.sql().to_string()
    }

    #[test]
    fn customer_scope_pins_availability() {
        let sql = filter_sql(PartScope::Customer, &PartQuery::default());
        assert!(sql.contains("p.availability = 'available'"));
    }

    #[test]
    fn customer_scope_ignores_availability_and_shopkeeper_filters() {
        let query = PartQuery {
            availability: Some(Availability::Sold),
            shopkeeper: Some(Uuid::new_v4()),
            ..Default::default()
        };
        let sql = filter_sql(PartScope::Customer, &query);
        assert!(sql.contains("p.availability = 'available'"));
        assert!(!sql.contains("p.availability = $"));
        assert!(!sql.contains("p.shopkeeper_id"));
    }

    #[test]
    fn shopkeeper_scope_always_filters_by_owner() {
        let sql = filter_sql(PartScope::Shopkeeper(Uuid::new_v4()), &PartQuery::default());
        assert!(sql.contains("p.shopkeeper_id = $1"));
    }

    #[test]
    fn admin_scope_honors_the_shopkeeper_filter() {
        let sql = filter_sql(PartScope::Admin, &PartQuery::default());
        assert!(!sql.contains("p.shopkeeper_id"));

        let query = PartQuery {
            shopkeeper: Some(Uuid::new_v4()),
            ..Default::default()
        };
        let sql = filter_sql(PartScope::Admin, &query);
        assert!(sql.contains("p.shopkeeper_id = $1"));
    }

    #[test]
    fn all_filters_materialize_as_predicates() {
        let query = PartQuery {
            search: Some("brake".into()),
            company: Some(Uuid::new_v4()),
            model: Some(Uuid::new_v4()),
            category: Some(Uuid::new_v4()),
            condition: Some(crate::models::Condition::Used),
            availability: Some(Availability::Available),
            min_price: Some(1000.0),
            max_price: Some(2000.0),
            city: Some("Pune".into()),
            state: Some("MH".into()),
            ..Default::default()
        };
        let sql = filter_sql(PartScope::Admin, &query);
        for clause in [
            "p.name ILIKE",
            "p.description ILIKE",
            "p.company_id =",
            "p.model_id =",
            "p.category_id =",
            "p.condition =",
            "p.availability =",
            "p.selling_price >=",
            "p.selling_price <=",
            "p.location_city ILIKE",
            "p.location_state ILIKE",
        ] {
            assert!(sql.contains(clause), "missing clause: {clause}");
        }
    }

    #[test]
    fn blank_search_and_location_are_ignored() {
        let query = PartQuery {
            search: Some("   ".into()),
            city: Some("".into()),
            state: Some(" ".into()),
            ..Default::default()
        };
        let sql = filter_sql(PartScope::Admin, &query);
        assert_eq!(sql, " WHERE 1=1");
    }

    #[test]
    fn count_and_page_share_one_predicate() {
        // The consistency requirement: the count query and the row query
        // are built from the same filter fragment.
        let query = PartQuery {
            search: Some("clutch".into()),
            min_price: Some(500.0),
            ..Default::default()
        };

        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM parts p");
        push_filters(&mut count_builder, PartScope::Customer, &query);
        let count_sql = count_builder.sql().to_string();

        let mut row_builder = QueryBuilder::new(SELECT_VIEW);
        push_filters(&mut row_builder, PartScope::Customer, &query);
        let row_sql = row_builder.sql().to_string();

        let count_where = count_sql.split_once(" WHERE ").unwrap().1;
        let row_where = row_sql.split_once(" WHERE ").unwrap().1;
        assert_eq!(count_where, row_where);
    }
}
