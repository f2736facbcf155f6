//! PostgreSQL-backed `CatalogStore` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CatalogError, CatalogStore, ReviewDecision};
use crate::domain::{ClassOffering, Email, OfferingStatus};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewOfferingRow, OfferingReviewUpdate, OfferingRow};
use super::pool::{DbPool, PoolError};
use super::schema::class_offerings;

/// Diesel-backed implementation of the catalogue port.
#[derive(Clone)]
pub struct DieselCatalogStore {
    pool: DbPool,
}

impl DieselCatalogStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> CatalogError {
    map_pool_error(error, CatalogError::connection)
}

fn map_diesel(error: diesel::result::Error) -> CatalogError {
    map_diesel_error(error, CatalogError::query, CatalogError::connection)
}

/// Convert a database row into a validated domain offering.
fn row_to_offering(row: OfferingRow) -> Result<ClassOffering, CatalogError> {
    let OfferingRow {
        id,
        owner_email,
        name,
        seats,
        price,
        status,
        feedback,
    } = row;

    let owner_email =
        Email::new(&owner_email).map_err(|err| CatalogError::query(err.to_string()))?;
    let status = OfferingStatus::parse(&status).map_err(|err| CatalogError::query(err.to_string()))?;

    Ok(ClassOffering {
        id,
        owner_email,
        name,
        seats,
        price,
        status,
        feedback,
    })
}

#[async_trait]
impl CatalogStore for DieselCatalogStore {
    async fn insert(&self, offering: &ClassOffering) -> Result<(), CatalogError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let new_row = NewOfferingRow {
            id: offering.id,
            owner_email: offering.owner_email.as_str(),
            name: offering.name.as_str(),
            seats: offering.seats,
            price: offering.price,
            status: offering.status.as_str(),
            feedback: offering.feedback.as_deref(),
        };

        diesel::insert_into(class_offerings::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ClassOffering>, CatalogError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = class_offerings::table
            .filter(class_offerings::id.eq(id))
            .select(OfferingRow::as_select())
            .first::<OfferingRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_offering).transpose()
    }

    async fn review(&self, id: Uuid, decision: &ReviewDecision) -> Result<(), CatalogError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let update = OfferingReviewUpdate {
            status: decision.status().as_str(),
            feedback: decision.feedback(),
        };

        let updated = diesel::update(class_offerings::table.filter(class_offerings::id.eq(id)))
            .set(&update)
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;

        if updated == 0 {
            return Err(CatalogError::NotFound);
        }
        Ok(())
    }

    async fn list_by_status(
        &self,
        status: OfferingStatus,
    ) -> Result<Vec<ClassOffering>, CatalogError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<OfferingRow> = class_offerings::table
            .filter(class_offerings::status.eq(status.as_str()))
            .select(OfferingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_offering).collect()
    }

    async fn list_all(&self) -> Result<Vec<ClassOffering>, CatalogError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<OfferingRow> = class_offerings::table
            .select(OfferingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_offering).collect()
    }

    async fn list_by_owner(&self, owner: &Email) -> Result<Vec<ClassOffering>, CatalogError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<OfferingRow> = class_offerings::table
            .filter(class_offerings::owner_email.eq(owner.as_str()))
            .select(OfferingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_offering).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion.

    use rstest::{fixture, rstest};
    use rust_decimal_macros::dec;

    use super::*;

    #[fixture]
    fn valid_row() -> OfferingRow {
        OfferingRow {
            id: Uuid::new_v4(),
            owner_email: "ana@x.com".to_owned(),
            name: "Pottery".to_owned(),
            seats: 8,
            price: dec!(25),
            status: "pending".to_owned(),
            feedback: None,
        }
    }

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let err = map_pool(PoolError::checkout("connection refused"));
        assert!(matches!(err, CatalogError::Connection { .. }));
    }

    #[rstest]
    fn valid_rows_convert(valid_row: OfferingRow) {
        let offering = row_to_offering(valid_row).expect("valid row");
        assert_eq!(offering.status, OfferingStatus::Pending);
        assert_eq!(offering.seats, 8);
    }

    #[rstest]
    fn rows_with_unknown_statuses_are_rejected(mut valid_row: OfferingRow) {
        valid_row.status = "archived".to_owned();
        let err = row_to_offering(valid_row).expect_err("unknown status rejected");
        assert!(matches!(err, CatalogError::Query { .. }));
        assert!(err.to_string().contains("archived"));
    }
}
