use std::sync::Arc;

use rutero_core::identity;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CatalogError;
use crate::repository::LineStore;

/// A bus operating company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusLine {
    /// Derived key, e.g. `RLBSW-856996` for the Rail Bus Way company.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub mobile_number: String,
    /// Creation time as unix epoch seconds.
    #[serde(default)]
    pub date_created: String,
}

/// Partial line update; blank fields keep their stored values. The name,
/// company and id never change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineChange {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub mobile_number: String,
}

#[derive(Debug, Clone, Default)]
pub struct LineFilter {
    pub name: Option<String>,
    pub company: Option<String>,
}

/// Registration and maintenance of bus lines.
pub struct LineService {
    lines: Arc<dyn LineStore>,
}

impl LineService {
    pub fn new(lines: Arc<dyn LineStore>) -> Self {
        Self { lines }
    }

    /// Registers a bus line; the key derives from the company name.
    pub async fn create(&self, mut line: BusLine) -> Result<BusLine, CatalogError> {
        validate_new(&line)?;

        if self.lines.exists(&line.name, &line.company).await? {
            return Err(CatalogError::DuplicateLine(line.name, line.company));
        }

        line.date_created = identity::epoch_stamp();
        line.id = format!(
            "{}-{}",
            identity::key_fragment(&line.company),
            identity::stamp_digits(&line.date_created)
        );

        self.lines.put(&line).await?;
        info!(id = %line.id, "registered bus line");

        Ok(line)
    }

    pub async fn find(&self, id: &str, name: &str) -> Result<Option<BusLine>, CatalogError> {
        Ok(self.lines.get(id, name).await?)
    }

    /// Applies non-blank fields onto the stored record.
    pub async fn update(
        &self,
        id: &str,
        name: &str,
        change: LineChange,
    ) -> Result<BusLine, CatalogError> {
        let mut line = self
            .lines
            .get(id, name)
            .await?
            .ok_or(CatalogError::LineNotFound)?;

        if !change.owner.is_empty() {
            line.owner = change.owner;
        }
        if !change.email.is_empty() {
            line.email = change.email;
        }
        if !change.address.is_empty() {
            line.address = change.address;
        }
        if !change.mobile_number.is_empty() {
            line.mobile_number = change.mobile_number;
        }

        self.lines.put(&line).await?;

        Ok(line)
    }

    pub async fn search(&self, filter: &LineFilter) -> Result<Vec<BusLine>, CatalogError> {
        Ok(self.lines.filter(filter).await?)
    }
}

fn validate_new(line: &BusLine) -> Result<(), CatalogError> {
    let mut fields = Vec::new();

    if line.name.is_empty() {
        fields.push("name");
    }
    if line.owner.is_empty() {
        fields.push("owner");
    }
    if line.email.is_empty() {
        fields.push("email");
    }
    if line.company.is_empty() {
        fields.push("company");
    }
    if line.mobile_number.is_empty() {
        fields.push("mobile_number");
    }

    if !fields.is_empty() {
        return Err(CatalogError::Validation(format!(
            "missing {} field(s)",
            fields.join(", ")
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::FakeLineStore;

    fn line() -> BusLine {
        BusLine {
            id: String::new(),
            name: "Metro Express".into(),
            owner: "Jane Roe".into(),
            email: "ops@railbusway.com".into(),
            address: "1 Depot Road".into(),
            company: "Rail Bus Way".into(),
            mobile_number: "09123456789".into(),
            date_created: String::new(),
        }
    }

    #[tokio::test]
    async fn create_derives_the_company_key() {
        let service = LineService::new(Arc::new(FakeLineStore::new()));

        let created = service.create(line()).await.unwrap();

        assert!(created.id.starts_with("RLBSW-"));
        assert_eq!(created.id.len(), "RLBSW-".len() + 6);
    }

    #[tokio::test]
    async fn create_rejects_missing_fields() {
        let service = LineService::new(Arc::new(FakeLineStore::new()));
        let incomplete = BusLine {
            owner: String::new(),
            mobile_number: String::new(),
            ..line()
        };

        let err = service.create(incomplete).await.unwrap_err();

        assert_eq!(err.to_string(), "missing owner, mobile_number field(s)");
    }

    #[tokio::test]
    async fn create_rejects_duplicates_by_name_and_company() {
        let service = LineService::new(Arc::new(FakeLineStore::new()));
        service.create(line()).await.unwrap();

        let err = service.create(line()).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Metro Express bus line from Rail Bus Way company already exist"
        );
    }

    #[tokio::test]
    async fn update_keeps_stored_values_for_blank_fields() {
        let service = LineService::new(Arc::new(FakeLineStore::new()));
        let created = service.create(line()).await.unwrap();

        let updated = service
            .update(
                &created.id,
                &created.name,
                LineChange {
                    owner: "New Owner".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.owner, "New Owner");
        assert_eq!(updated.email, "ops@railbusway.com");
        assert_eq!(updated.company, "Rail Bus Way");
    }

    #[tokio::test]
    async fn update_of_a_missing_line_is_rejected() {
        let service = LineService::new(Arc::new(FakeLineStore::new()));

        let err = service
            .update("RLBSW-000000", "Metro Express", LineChange::default())
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::LineNotFound));
    }
}
