use std::sync::Arc;

use rutero_core::identity;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CatalogError;
use crate::repository::UnitStore;

/// A vehicle operated by a bus line, with its passenger capacity band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusUnit {
    /// Derived key: the unit code uppercased plus the creation stamp digits.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub bus_id: String,
    #[serde(default)]
    pub code: String,
    /// Whether the unit is accepting trips.
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub min_capacity: u32,
    #[serde(default)]
    pub max_capacity: u32,
    /// Creation time as unix epoch seconds.
    #[serde(default)]
    pub date_created: String,
}

/// Partial unit update; blank fields keep their stored values. The code,
/// bus id and id never change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnitChange {
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub min_capacity: u32,
    #[serde(default)]
    pub max_capacity: u32,
}

#[derive(Debug, Clone, Default)]
pub struct UnitFilter {
    pub code: Option<String>,
    pub bus_id: Option<String>,
    pub active: Option<bool>,
}

/// Registration and maintenance of bus units.
pub struct UnitService {
    units: Arc<dyn UnitStore>,
}

impl UnitService {
    pub fn new(units: Arc<dyn UnitStore>) -> Self {
        Self { units }
    }

    /// Registers a bus unit under its owning line.
    pub async fn create(&self, mut unit: BusUnit) -> Result<BusUnit, CatalogError> {
        validate_new(&unit)?;

        if self.units.exists(&unit.code, &unit.bus_id).await? {
            return Err(CatalogError::DuplicateUnit);
        }

        unit.date_created = identity::epoch_stamp();
        unit.id = format!(
            "{}{}",
            unit.code.to_uppercase(),
            identity::stamp_digits(&unit.date_created)
        );

        self.units.put(&unit).await?;
        info!(id = %unit.id, "registered bus unit");

        Ok(unit)
    }

    pub async fn find(&self, code: &str, bus_id: &str) -> Result<Option<BusUnit>, CatalogError> {
        Ok(self.units.get(code, bus_id).await?)
    }

    /// Applies non-blank fields onto the stored record. A max capacity that
    /// would fall below the stored minimum keeps the stored value instead.
    pub async fn update(
        &self,
        code: &str,
        bus_id: &str,
        change: UnitChange,
    ) -> Result<BusUnit, CatalogError> {
        let mut unit = self
            .units
            .get(code, bus_id)
            .await?
            .ok_or(CatalogError::UnitNotFound)?;

        if change.active.is_some() {
            unit.active = change.active;
        }
        if change.min_capacity != 0 {
            unit.min_capacity = change.min_capacity;
        }
        if change.max_capacity != 0 && change.max_capacity >= unit.min_capacity {
            unit.max_capacity = change.max_capacity;
        }

        self.units.put(&unit).await?;

        Ok(unit)
    }

    pub async fn search(&self, filter: &UnitFilter) -> Result<Vec<BusUnit>, CatalogError> {
        Ok(self.units.filter(filter).await?)
    }
}

fn validate_new(unit: &BusUnit) -> Result<(), CatalogError> {
    let mut fields = Vec::new();

    if unit.bus_id.is_empty() {
        fields.push("bus_id");
    }
    if unit.code.is_empty() {
        fields.push("code");
    }
    if unit.active.is_none() {
        fields.push("active");
    }
    if unit.min_capacity == 0 {
        fields.push("min_capacity");
    }
    if unit.max_capacity == 0 {
        fields.push("max_capacity");
    }

    let capacity = (unit.max_capacity < unit.min_capacity).then(|| {
        format!(
            "cannot set {} as the max capacity that is lower than the min capacity",
            unit.max_capacity
        )
    });

    match (fields.is_empty(), capacity) {
        (true, None) => Ok(()),
        (true, Some(capacity)) => Err(CatalogError::Validation(capacity)),
        (false, None) => Err(CatalogError::Validation(format!(
            "missing {} field(s)",
            fields.join(", ")
        ))),
        (false, Some(capacity)) => Err(CatalogError::Validation(format!(
            "missing {} field(s) and {}",
            fields.join(", "),
            capacity
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::FakeUnitStore;

    fn unit() -> BusUnit {
        BusUnit {
            id: String::new(),
            bus_id: "RLBSW-856996".into(),
            code: "xyz-bus-0001".into(),
            active: Some(true),
            min_capacity: 40,
            max_capacity: 50,
            date_created: String::new(),
        }
    }

    #[tokio::test]
    async fn create_uppercases_the_code_into_the_key() {
        let service = UnitService::new(Arc::new(FakeUnitStore::new()));

        let created = service.create(unit()).await.unwrap();

        assert!(created.id.starts_with("XYZ-BUS-0001"));
        assert_eq!(created.id.len(), "XYZ-BUS-0001".len() + 6);
    }

    #[tokio::test]
    async fn create_rejects_an_inverted_capacity_band() {
        let service = UnitService::new(Arc::new(FakeUnitStore::new()));
        let inverted = BusUnit {
            min_capacity: 50,
            max_capacity: 30,
            ..unit()
        };

        let err = service.create(inverted).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "cannot set 30 as the max capacity that is lower than the min capacity"
        );
    }

    #[tokio::test]
    async fn create_combines_missing_fields_with_the_capacity_complaint() {
        let service = UnitService::new(Arc::new(FakeUnitStore::new()));
        let broken = BusUnit {
            code: String::new(),
            min_capacity: 50,
            max_capacity: 30,
            ..unit()
        };

        let err = service.create(broken).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "missing code field(s) and cannot set 30 as the max capacity that is lower than the min capacity"
        );
    }

    #[tokio::test]
    async fn create_rejects_duplicate_code_per_line() {
        let service = UnitService::new(Arc::new(FakeUnitStore::new()));
        service.create(unit()).await.unwrap();

        let err = service.create(unit()).await.unwrap_err();

        assert!(matches!(err, CatalogError::DuplicateUnit));
    }

    #[tokio::test]
    async fn update_never_lowers_max_below_the_stored_min() {
        let service = UnitService::new(Arc::new(FakeUnitStore::new()));
        let created = service.create(unit()).await.unwrap();

        let updated = service
            .update(
                &created.code,
                &created.bus_id,
                UnitChange {
                    active: Some(false),
                    max_capacity: 10,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.active, Some(false));
        assert_eq!(updated.max_capacity, 50);
    }
}
