//! In-memory store doubles for unit and integration tests.
//!
//! One shared map per store, all guarded by a single mutex so the settlement
//! double honours the same atomicity contract as the PostgreSQL adapter:
//! the three settlement steps apply under one lock acquisition, and a
//! refused step leaves nothing behind.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::ports::{
    BookingError, BookingStore, CatalogError, CatalogStore, DeletePendingOutcome, DirectoryError,
    DirectoryStore, PaymentIntent, PaymentLedger, PaymentLedgerError, PaymentProvider,
    PaymentProviderError, RegistrationOutcome, ReviewDecision, SettlementStore,
    SettlementStoreError,
};
use crate::domain::{
    Booking, BookingStatus, ClassOffering, Email, OfferingStatus, Payment, Role,
    SettlementOutcome, SettlementRefusal, SettlementRequest, User,
};

#[derive(Default)]
struct MemoryDb {
    users: HashMap<String, User>,
    offerings: HashMap<Uuid, ClassOffering>,
    bookings: HashMap<Uuid, Booking>,
    payments: Vec<Payment>,
}

/// Shared in-memory implementation of every store port.
#[derive(Clone, Default)]
pub struct MemoryStores {
    db: Arc<Mutex<MemoryDb>>,
}

impl MemoryStores {
    /// Fresh, empty stores.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryDb> {
        self.db.lock().expect("memory store lock")
    }

    /// Seed a directory record with the given role, returning its id.
    pub fn seed_user(&self, email: &Email, role: Role) -> Uuid {
        let user = User {
            id: Uuid::new_v4(),
            email: email.clone(),
            role,
        };
        let id = user.id;
        self.lock().users.insert(email.as_str().to_owned(), user);
        id
    }

    /// Seed an offering, returning its id.
    pub fn seed_offering(&self, offering: ClassOffering) -> Uuid {
        let id = offering.id;
        self.lock().offerings.insert(id, offering);
        id
    }

    /// Seed a booking, returning its id.
    pub fn seed_booking(&self, booking: Booking) -> Uuid {
        let id = booking.id;
        self.lock().bookings.insert(id, booking);
        id
    }

    /// Snapshot of the payment ledger.
    pub fn payments(&self) -> Vec<Payment> {
        self.lock().payments.clone()
    }

    /// Snapshot of one offering.
    pub fn offering(&self, id: Uuid) -> Option<ClassOffering> {
        self.lock().offerings.get(&id).cloned()
    }

    /// Snapshot of one booking.
    pub fn booking(&self, id: Uuid) -> Option<Booking> {
        self.lock().bookings.get(&id).cloned()
    }
}

#[async_trait]
impl DirectoryStore for MemoryStores {
    async fn insert_if_absent(&self, user: &User) -> Result<RegistrationOutcome, DirectoryError> {
        let mut db = self.lock();
        if db.users.contains_key(user.email.as_str()) {
            return Ok(RegistrationOutcome::AlreadyExists);
        }
        db.users.insert(user.email.as_str().to_owned(), user.clone());
        Ok(RegistrationOutcome::Created(user.clone()))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, DirectoryError> {
        Ok(self.lock().users.get(email.as_str()).cloned())
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<(), DirectoryError> {
        let mut db = self.lock();
        let user = db
            .users
            .values_mut()
            .find(|user| user.id == id)
            .ok_or(DirectoryError::NotFound)?;
        user.role = role;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DirectoryError> {
        let mut db = self.lock();
        let key = db
            .users
            .values()
            .find(|user| user.id == id)
            .map(|user| user.email.as_str().to_owned())
            .ok_or(DirectoryError::NotFound)?;
        db.users.remove(&key);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, DirectoryError> {
        Ok(self.lock().users.values().cloned().collect())
    }
}

#[async_trait]
impl CatalogStore for MemoryStores {
    async fn insert(&self, offering: &ClassOffering) -> Result<(), CatalogError> {
        self.lock().offerings.insert(offering.id, offering.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ClassOffering>, CatalogError> {
        Ok(self.lock().offerings.get(&id).cloned())
    }

    async fn review(&self, id: Uuid, decision: &ReviewDecision) -> Result<(), CatalogError> {
        let mut db = self.lock();
        let offering = db.offerings.get_mut(&id).ok_or(CatalogError::NotFound)?;
        offering.status = decision.status();
        offering.feedback = decision.feedback().map(str::to_owned);
        Ok(())
    }

    async fn list_by_status(
        &self,
        status: OfferingStatus,
    ) -> Result<Vec<ClassOffering>, CatalogError> {
        Ok(self
            .lock()
            .offerings
            .values()
            .filter(|offering| offering.status == status)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<ClassOffering>, CatalogError> {
        Ok(self.lock().offerings.values().cloned().collect())
    }

    async fn list_by_owner(&self, owner: &Email) -> Result<Vec<ClassOffering>, CatalogError> {
        Ok(self
            .lock()
            .offerings
            .values()
            .filter(|offering| offering.owner_email == *owner)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BookingStore for MemoryStores {
    async fn insert(&self, booking: &Booking) -> Result<(), BookingError> {
        self.lock().bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, BookingError> {
        Ok(self.lock().bookings.get(&id).cloned())
    }

    async fn list_by_student(&self, student: &Email) -> Result<Vec<Booking>, BookingError> {
        Ok(self
            .lock()
            .bookings
            .values()
            .filter(|booking| booking.student_email == *student)
            .cloned()
            .collect())
    }

    async fn delete_pending(
        &self,
        id: Uuid,
        student: &Email,
    ) -> Result<DeletePendingOutcome, BookingError> {
        let mut db = self.lock();
        let Some(booking) = db.bookings.get(&id) else {
            return Ok(DeletePendingOutcome::Missing);
        };
        if booking.student_email != *student {
            return Ok(DeletePendingOutcome::NotOwner);
        }
        if booking.status != BookingStatus::Pending {
            return Ok(DeletePendingOutcome::NotPending);
        }
        db.bookings.remove(&id);
        Ok(DeletePendingOutcome::Deleted)
    }
}

#[async_trait]
impl PaymentLedger for MemoryStores {
    async fn list_by_student(&self, student: &Email) -> Result<Vec<Payment>, PaymentLedgerError> {
        Ok(self
            .lock()
            .payments
            .iter()
            .filter(|payment| payment.student_email == *student)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SettlementStore for MemoryStores {
    async fn settle(
        &self,
        request: &SettlementRequest,
    ) -> Result<SettlementOutcome, SettlementStoreError> {
        // One lock acquisition covers all three steps, mirroring the SQL
        // transaction: a refusal mutates nothing.
        let mut db = self.lock();

        let refusal = match db.bookings.get(&request.booking_id) {
            None => Some(SettlementRefusal::BookingMissing),
            Some(booking) if booking.status != BookingStatus::Pending => {
                Some(SettlementRefusal::BookingNotPending)
            }
            Some(_) => match db.offerings.get(&request.class_id) {
                None => Some(SettlementRefusal::ClassMissing),
                Some(offering) if offering.seats <= 0 => Some(SettlementRefusal::Overbooked),
                Some(_) => None,
            },
        };

        if let Some(refusal) = refusal {
            return Ok(SettlementOutcome::refused(refusal));
        }

        let payment = Payment {
            id: Uuid::new_v4(),
            booking_id: request.booking_id,
            class_id: request.class_id,
            amount: request.amount,
            student_email: request.student_email.clone(),
            recorded_at: Utc::now(),
        };
        db.payments.push(payment.clone());
        if let Some(booking) = db.bookings.get_mut(&request.booking_id) {
            booking.status = BookingStatus::Paid;
        }
        if let Some(offering) = db.offerings.get_mut(&request.class_id) {
            offering.seats -= 1;
        }

        Ok(SettlementOutcome::settled(payment))
    }
}

/// Provider double returning a fixed client secret.
#[derive(Clone)]
pub struct StubPaymentProvider {
    secret: String,
}

impl StubPaymentProvider {
    /// A double answering every intent with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl Default for StubPaymentProvider {
    fn default() -> Self {
        Self::new("pi_test_secret")
    }
}

#[async_trait]
impl PaymentProvider for StubPaymentProvider {
    async fn create_intent(
        &self,
        _amount: Decimal,
        _currency: &str,
    ) -> Result<PaymentIntent, PaymentProviderError> {
        Ok(PaymentIntent {
            client_secret: self.secret.clone(),
        })
    }
}
