use async_trait::async_trait;

use crate::line::{BusLine, LineFilter};
use crate::route::{BusRoute, RouteFilter, RouteKey};
use crate::unit::{BusUnit, UnitFilter};

/// Store trait for bus line records, keyed by (id, name).
#[async_trait]
pub trait LineStore: Send + Sync {
    async fn put(&self, line: &BusLine) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get(
        &self,
        id: &str,
        name: &str,
    ) -> Result<Option<BusLine>, Box<dyn std::error::Error + Send + Sync>>;

    /// Whether a line with this name already exists under the company.
    async fn exists(
        &self,
        name: &str,
        company: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    async fn filter(
        &self,
        filter: &LineFilter,
    ) -> Result<Vec<BusLine>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Store trait for bus unit records, keyed by (code, bus_id).
#[async_trait]
pub trait UnitStore: Send + Sync {
    async fn put(&self, unit: &BusUnit) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get(
        &self,
        code: &str,
        bus_id: &str,
    ) -> Result<Option<BusUnit>, Box<dyn std::error::Error + Send + Sync>>;

    async fn exists(
        &self,
        code: &str,
        bus_id: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    async fn filter(
        &self,
        filter: &UnitFilter,
    ) -> Result<Vec<BusUnit>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Store trait for bus route records, keyed by (id, bus_id).
#[async_trait]
pub trait RouteStore: Send + Sync {
    async fn put(&self, route: &BusRoute) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get(
        &self,
        key: &RouteKey,
    ) -> Result<Option<BusRoute>, Box<dyn std::error::Error + Send + Sync>>;

    /// Whether any stored route matches every field the filter carries.
    async fn exists_matching(
        &self,
        filter: &RouteFilter,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    async fn filter(
        &self,
        filter: &RouteFilter,
    ) -> Result<Vec<BusRoute>, Box<dyn std::error::Error + Send + Sync>>;
}
