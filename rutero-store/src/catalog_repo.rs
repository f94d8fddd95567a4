use async_trait::async_trait;
use sqlx::PgPool;

use rutero_catalog::line::{BusLine, LineFilter};
use rutero_catalog::repository::{LineStore, RouteStore, UnitStore};
use rutero_catalog::route::{BusRoute, RouteFilter, RouteKey};
use rutero_catalog::unit::{BusUnit, UnitFilter};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Bus line records in Postgres.
pub struct PgLineStore {
    pool: PgPool,
}

impl PgLineStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct LineRow {
    id: String,
    name: String,
    owner: String,
    email: String,
    address: String,
    company: String,
    mobile_number: String,
    date_created: String,
}

impl LineRow {
    fn into_domain(self) -> BusLine {
        BusLine {
            id: self.id,
            name: self.name,
            owner: self.owner,
            email: self.email,
            address: self.address,
            company: self.company,
            mobile_number: self.mobile_number,
            date_created: self.date_created,
        }
    }
}

#[async_trait]
impl LineStore for PgLineStore {
    async fn put(&self, line: &BusLine) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            INSERT INTO bus_lines (id, name, owner, email, address, company, mobile_number, date_created)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                owner = EXCLUDED.owner,
                email = EXCLUDED.email,
                address = EXCLUDED.address,
                company = EXCLUDED.company,
                mobile_number = EXCLUDED.mobile_number
            "#,
        )
        .bind(&line.id)
        .bind(&line.name)
        .bind(&line.owner)
        .bind(&line.email)
        .bind(&line.address)
        .bind(&line.company)
        .bind(&line.mobile_number)
        .bind(&line.date_created)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: &str, name: &str) -> Result<Option<BusLine>, BoxError> {
        let row: Option<LineRow> = sqlx::query_as(
            r#"
            SELECT id, name, owner, email, address, company, mobile_number, date_created
            FROM bus_lines
            WHERE id = $1 AND name = $2
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(LineRow::into_domain))
    }

    async fn exists(&self, name: &str, company: &str) -> Result<bool, BoxError> {
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM bus_lines WHERE name = $1 AND company = $2)",
        )
        .bind(name)
        .bind(company)
        .fetch_one(&self.pool)
        .await?;

        Ok(found)
    }

    async fn filter(&self, filter: &LineFilter) -> Result<Vec<BusLine>, BoxError> {
        let rows: Vec<LineRow> = sqlx::query_as(
            r#"
            SELECT id, name, owner, email, address, company, mobile_number, date_created
            FROM bus_lines
            WHERE ($1::TEXT IS NULL OR name = $1)
              AND ($2::TEXT IS NULL OR company = $2)
            ORDER BY date_created
            "#,
        )
        .bind(filter.name.as_deref())
        .bind(filter.company.as_deref())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(LineRow::into_domain).collect())
    }
}

/// Bus unit records in Postgres, keyed by (code, bus_id).
pub struct PgUnitStore {
    pool: PgPool,
}

impl PgUnitStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UnitRow {
    id: String,
    bus_id: String,
    code: String,
    active: Option<bool>,
    min_capacity: i32,
    max_capacity: i32,
    date_created: String,
}

impl UnitRow {
    fn into_domain(self) -> BusUnit {
        BusUnit {
            id: self.id,
            bus_id: self.bus_id,
            code: self.code,
            active: self.active,
            min_capacity: self.min_capacity as u32,
            max_capacity: self.max_capacity as u32,
            date_created: self.date_created,
        }
    }
}

#[async_trait]
impl UnitStore for PgUnitStore {
    async fn put(&self, unit: &BusUnit) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            INSERT INTO bus_units (id, bus_id, code, active, min_capacity, max_capacity, date_created)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (code, bus_id) DO UPDATE SET
                active = EXCLUDED.active,
                min_capacity = EXCLUDED.min_capacity,
                max_capacity = EXCLUDED.max_capacity
            "#,
        )
        .bind(&unit.id)
        .bind(&unit.bus_id)
        .bind(&unit.code)
        .bind(unit.active)
        .bind(unit.min_capacity as i32)
        .bind(unit.max_capacity as i32)
        .bind(&unit.date_created)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, code: &str, bus_id: &str) -> Result<Option<BusUnit>, BoxError> {
        let row: Option<UnitRow> = sqlx::query_as(
            r#"
            SELECT id, bus_id, code, active, min_capacity, max_capacity, date_created
            FROM bus_units
            WHERE code = $1 AND bus_id = $2
            "#,
        )
        .bind(code)
        .bind(bus_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UnitRow::into_domain))
    }

    async fn exists(&self, code: &str, bus_id: &str) -> Result<bool, BoxError> {
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM bus_units WHERE code = $1 AND bus_id = $2)",
        )
        .bind(code)
        .bind(bus_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(found)
    }

    async fn filter(&self, filter: &UnitFilter) -> Result<Vec<BusUnit>, BoxError> {
        let rows: Vec<UnitRow> = sqlx::query_as(
            r#"
            SELECT id, bus_id, code, active, min_capacity, max_capacity, date_created
            FROM bus_units
            WHERE ($1::TEXT IS NULL OR code = $1)
              AND ($2::TEXT IS NULL OR bus_id = $2)
              AND ($3::BOOLEAN IS NULL OR active = $3)
            ORDER BY date_created
            "#,
        )
        .bind(filter.code.as_deref())
        .bind(filter.bus_id.as_deref())
        .bind(filter.active)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UnitRow::into_domain).collect())
    }
}

/// Bus route records in Postgres, keyed by (id, bus_id).
pub struct PgRouteStore {
    pool: PgPool,
}

impl PgRouteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RouteRow {
    id: String,
    bus_id: String,
    bus_unit_id: String,
    currency_code: String,
    rate: Option<f64>,
    active: Option<bool>,
    departure_time: String,
    arrival_time: String,
    from_route: String,
    to_route: String,
    date_created: String,
}

impl RouteRow {
    fn into_domain(self) -> BusRoute {
        BusRoute {
            id: self.id,
            bus_id: self.bus_id,
            bus_unit_id: self.bus_unit_id,
            currency_code: self.currency_code,
            rate: self.rate,
            active: self.active,
            departure_time: self.departure_time,
            arrival_time: self.arrival_time,
            from_route: self.from_route,
            to_route: self.to_route,
            date_created: self.date_created,
        }
    }
}

#[async_trait]
impl RouteStore for PgRouteStore {
    async fn put(&self, route: &BusRoute) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            INSERT INTO bus_routes (id, bus_id, bus_unit_id, currency_code, rate, active, departure_time, arrival_time, from_route, to_route, date_created)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id, bus_id) DO UPDATE SET
                currency_code = EXCLUDED.currency_code,
                rate = EXCLUDED.rate,
                active = EXCLUDED.active,
                departure_time = EXCLUDED.departure_time,
                arrival_time = EXCLUDED.arrival_time,
                from_route = EXCLUDED.from_route,
                to_route = EXCLUDED.to_route
            "#,
        )
        .bind(&route.id)
        .bind(&route.bus_id)
        .bind(&route.bus_unit_id)
        .bind(&route.currency_code)
        .bind(route.rate)
        .bind(route.active)
        .bind(&route.departure_time)
        .bind(&route.arrival_time)
        .bind(&route.from_route)
        .bind(&route.to_route)
        .bind(&route.date_created)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, key: &RouteKey) -> Result<Option<BusRoute>, BoxError> {
        let row: Option<RouteRow> = sqlx::query_as(
            r#"
            SELECT id, bus_id, bus_unit_id, currency_code, rate, active, departure_time, arrival_time, from_route, to_route, date_created
            FROM bus_routes
            WHERE id = $1 AND bus_id = $2
            "#,
        )
        .bind(&key.id)
        .bind(&key.bus_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RouteRow::into_domain))
    }

    async fn exists_matching(&self, filter: &RouteFilter) -> Result<bool, BoxError> {
        let found: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bus_routes
                WHERE ($1::TEXT IS NULL OR bus_id = $1)
                  AND ($2::TEXT IS NULL OR bus_unit_id = $2)
                  AND ($3::BOOLEAN IS NULL OR active = $3)
                  AND ($4::TEXT IS NULL OR departure_time = $4)
                  AND ($5::TEXT IS NULL OR arrival_time = $5)
                  AND ($6::TEXT IS NULL OR from_route = $6)
                  AND ($7::TEXT IS NULL OR to_route = $7)
            )
            "#,
        )
        .bind(filter.bus_id.as_deref())
        .bind(filter.bus_unit_id.as_deref())
        .bind(filter.active)
        .bind(filter.departure_time.as_deref())
        .bind(filter.arrival_time.as_deref())
        .bind(filter.from_route.as_deref())
        .bind(filter.to_route.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(found)
    }

    async fn filter(&self, filter: &RouteFilter) -> Result<Vec<BusRoute>, BoxError> {
        let rows: Vec<RouteRow> = sqlx::query_as(
            r#"
            SELECT id, bus_id, bus_unit_id, currency_code, rate, active, departure_time, arrival_time, from_route, to_route, date_created
            FROM bus_routes
            WHERE ($1::TEXT IS NULL OR bus_id = $1)
              AND ($2::TEXT IS NULL OR bus_unit_id = $2)
              AND ($3::BOOLEAN IS NULL OR active = $3)
              AND ($4::TEXT IS NULL OR departure_time = $4)
              AND ($5::TEXT IS NULL OR arrival_time = $5)
              AND ($6::TEXT IS NULL OR from_route = $6)
              AND ($7::TEXT IS NULL OR to_route = $7)
            ORDER BY date_created
            "#,
        )
        .bind(filter.bus_id.as_deref())
        .bind(filter.bus_unit_id.as_deref())
        .bind(filter.active)
        .bind(filter.departure_time.as_deref())
        .bind(filter.arrival_time.as_deref())
        .bind(filter.from_route.as_deref())
        .bind(filter.to_route.as_deref())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RouteRow::into_domain).collect())
    }
}
