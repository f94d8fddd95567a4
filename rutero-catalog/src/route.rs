use std::sync::Arc;

use rutero_core::identity;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CatalogError;
use crate::repository::RouteStore;

/// A scheduled trip offered by a bus unit, with its fare and timetable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusRoute {
    /// Derived key: vowel-stripped FROM and TO names, the departure and
    /// arrival times without separators and the creation stamp digits.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub bus_id: String,
    #[serde(default)]
    pub bus_unit_id: String,
    #[serde(default)]
    pub currency_code: String,
    /// Fare charged to the passenger.
    #[serde(default)]
    pub rate: Option<f64>,
    /// Whether the unit serves this route.
    #[serde(default)]
    pub active: Option<bool>,
    /// 24-hour format, e.g. "15:00".
    #[serde(default)]
    pub departure_time: String,
    #[serde(default)]
    pub arrival_time: String,
    #[serde(default)]
    pub from_route: String,
    #[serde(default)]
    pub to_route: String,
    /// Creation time as unix epoch seconds.
    #[serde(default)]
    pub date_created: String,
}

impl BusRoute {
    /// The fields that describe a route for duplicate detection, taken
    /// from the record itself.
    fn describing_filter(&self) -> RouteFilter {
        RouteFilter {
            bus_id: Some(self.bus_id.clone()),
            bus_unit_id: Some(self.bus_unit_id.clone()),
            active: self.active,
            departure_time: Some(self.departure_time.clone()),
            arrival_time: Some(self.arrival_time.clone()),
            from_route: Some(self.from_route.clone()),
            to_route: Some(self.to_route.clone()),
        }
    }
}

/// Composite storage key of a route record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteKey {
    pub id: String,
    pub bus_id: String,
}

/// Partial route update; blank fields keep their stored values. The id,
/// bus id and bus unit id never change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteChange {
    #[serde(default)]
    pub currency_code: String,
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub departure_time: String,
    #[serde(default)]
    pub arrival_time: String,
    #[serde(default)]
    pub from_route: String,
    #[serde(default)]
    pub to_route: String,
}

#[derive(Debug, Clone, Default)]
pub struct RouteFilter {
    pub bus_id: Option<String>,
    pub bus_unit_id: Option<String>,
    pub active: Option<bool>,
    pub departure_time: Option<String>,
    pub arrival_time: Option<String>,
    pub from_route: Option<String>,
    pub to_route: Option<String>,
}

/// Registration and maintenance of bus routes.
pub struct RouteService {
    routes: Arc<dyn RouteStore>,
}

impl RouteService {
    pub fn new(routes: Arc<dyn RouteStore>) -> Self {
        Self { routes }
    }

    /// Registers a route. Two routes with the same describing fields are
    /// the same trip, so the second registration is rejected.
    pub async fn create(&self, mut route: BusRoute) -> Result<BusRoute, CatalogError> {
        validate_new(&route)?;

        if self.routes.exists_matching(&route.describing_filter()).await? {
            return Err(CatalogError::DuplicateRoute);
        }

        route.date_created = identity::epoch_stamp();
        route.id = format!(
            "{}{}{}{}{}",
            identity::key_fragment(&route.from_route),
            identity::key_fragment(&route.to_route),
            route.departure_time.replace(':', ""),
            route.arrival_time.replace(':', ""),
            identity::stamp_digits(&route.date_created)
        );

        self.routes.put(&route).await?;
        info!(id = %route.id, "registered bus route");

        Ok(route)
    }

    pub async fn find(&self, key: &RouteKey) -> Result<Option<BusRoute>, CatalogError> {
        Ok(self.routes.get(key).await?)
    }

    /// Applies non-blank fields onto the stored record.
    pub async fn update(&self, key: &RouteKey, change: RouteChange) -> Result<BusRoute, CatalogError> {
        let mut route = self
            .routes
            .get(key)
            .await?
            .ok_or(CatalogError::RouteNotFound)?;

        if !change.currency_code.is_empty() {
            route.currency_code = change.currency_code;
        }
        if change.rate.is_some() {
            route.rate = change.rate;
        }
        if change.active.is_some() {
            route.active = change.active;
        }
        if !change.departure_time.is_empty() {
            route.departure_time = change.departure_time;
        }
        if !change.arrival_time.is_empty() {
            route.arrival_time = change.arrival_time;
        }
        if !change.from_route.is_empty() {
            route.from_route = change.from_route;
        }
        if !change.to_route.is_empty() {
            route.to_route = change.to_route;
        }

        self.routes.put(&route).await?;

        Ok(route)
    }

    pub async fn search(&self, filter: &RouteFilter) -> Result<Vec<BusRoute>, CatalogError> {
        Ok(self.routes.filter(filter).await?)
    }
}

fn validate_new(route: &BusRoute) -> Result<(), CatalogError> {
    let mut fields = Vec::new();

    if route.bus_id.is_empty() {
        fields.push("bus_id");
    }
    if route.bus_unit_id.is_empty() {
        fields.push("bus_unit_id");
    }
    if route.currency_code.is_empty() {
        fields.push("currency_code");
    }
    if route.rate.is_none() {
        fields.push("rate");
    }
    if route.active.is_none() {
        fields.push("active");
    }
    if route.departure_time.is_empty() {
        fields.push("departure_time");
    }
    if route.arrival_time.is_empty() {
        fields.push("arrival_time");
    }
    if route.from_route.is_empty() {
        fields.push("from_route");
    }
    if route.to_route.is_empty() {
        fields.push("to_route");
    }

    if fields.is_empty() {
        return Ok(());
    }

    Err(CatalogError::Validation(format!(
        "missing {} field(s)",
        fields.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::FakeRouteStore;

    fn route() -> BusRoute {
        BusRoute {
            id: String::new(),
            bus_id: "SNRSBSS-875011".into(),
            bus_unit_id: "SNRSBSSBUS002".into(),
            currency_code: "PHP".into(),
            rate: Some(90.0),
            active: Some(true),
            departure_time: "15:00".into(),
            arrival_time: "19:00".into(),
            from_route: "Route A".into(),
            to_route: "Route B".into(),
            date_created: String::new(),
        }
    }

    #[tokio::test]
    async fn create_derives_the_key_from_the_trip_description() {
        let service = RouteService::new(Arc::new(FakeRouteStore::new()));

        let created = service.create(route()).await.unwrap();

        assert!(created.id.starts_with("RTRTB15001900"));
        assert_eq!(created.id.len(), "RTRTB15001900".len() + 6);
    }

    #[tokio::test]
    async fn create_rejects_a_route_with_the_same_description() {
        let service = RouteService::new(Arc::new(FakeRouteStore::new()));
        service.create(route()).await.unwrap();

        let err = service.create(route()).await.unwrap_err();

        assert_eq!(err.to_string(), "already existing bus route");
    }

    #[tokio::test]
    async fn create_names_every_missing_field() {
        let service = RouteService::new(Arc::new(FakeRouteStore::new()));
        let broken = BusRoute {
            currency_code: String::new(),
            rate: None,
            ..route()
        };

        let err = service.create(broken).await.unwrap_err();

        assert_eq!(err.to_string(), "missing currency_code, rate field(s)");
    }

    #[tokio::test]
    async fn update_keeps_stored_values_for_blank_fields() {
        let service = RouteService::new(Arc::new(FakeRouteStore::new()));
        let created = service.create(route()).await.unwrap();
        let key = RouteKey {
            id: created.id.clone(),
            bus_id: created.bus_id.clone(),
        };

        let updated = service
            .update(
                &key,
                RouteChange {
                    active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.active, Some(false));
        assert_eq!(updated.rate, Some(90.0));
        assert_eq!(updated.bus_unit_id, "SNRSBSSBUS002");
        assert_eq!(updated.departure_time, "15:00");
    }

    #[tokio::test]
    async fn update_rejects_an_unknown_route() {
        let service = RouteService::new(Arc::new(FakeRouteStore::new()));
        let key = RouteKey {
            id: "RTRTB15001900877732".into(),
            bus_id: "SNRSBSS-875011".into(),
        };

        let err = service.update(&key, RouteChange::default()).await.unwrap_err();

        assert!(matches!(err, CatalogError::RouteNotFound));
    }
}
