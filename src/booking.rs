//! Booking lifecycle management.
//!
//! Bookings are created Pending by a customer, approved or rejected by an
//! admin, and completed by the customer's payment. Rejection restores the
//! bike's availability; payment takes it. Creation itself never reserves
//! the bike.

use chrono::{Local, NaiveDate, Utc};

use crate::errors::{Error, Result};
use crate::ident;
use crate::inventory::InventoryManager;
use crate::models::{Booking, BookingStatus, User};
use crate::store::Store;

/// A customer's request for a new booking
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub customer: String,
    pub bike_id: String,
    pub pickup_location: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

/// Listing filter for admin and customer views
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub customer: Option<String>,
    pub status: Option<BookingStatus>,
}

/// Booking creation, status transitions, and lookups over the store.
pub struct BookingManager<'a> {
    store: &'a Store,
}

impl<'a> BookingManager<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Create a Pending booking for the current date.
    pub fn create_booking(&self, req: BookingRequest) -> Result<Booking> {
        self.create_booking_as_of(req, Local::now().date_naive())
    }

    /// Create a Pending booking, validating the date range against `today`.
    ///
    /// The bike must exist, be available, and sit in the requested pickup
    /// location (case-insensitive). The requested range must not overlap
    /// any Pending or Approved booking for the same bike.
    pub fn create_booking_as_of(&self, req: BookingRequest, today: NaiveDate) -> Result<Booking> {
        if req.from_date > req.to_date {
            return Err(Error::validation("from date must be on or before to date"));
        }
        if req.from_date < today {
            return Err(Error::validation("from date cannot be in the past"));
        }

        let bikes = self.store.load_bikes();
        let bike = bikes
            .iter()
            .find(|b| b.id == req.bike_id)
            .ok_or_else(|| Error::not_found("bike", &req.bike_id))?;
        if !bike.available || !bike.location.eq_ignore_ascii_case(&req.pickup_location) {
            return Err(Error::validation(format!(
                "no available bike {} in {}",
                req.bike_id, req.pickup_location
            )));
        }

        let mut bookings = self.store.load_bookings();
        let clash = bookings.iter().find(|b| {
            b.bike_id == req.bike_id
                && b.status.is_active()
                && b.overlaps(req.from_date, req.to_date)
        });
        if let Some(existing) = clash {
            return Err(Error::conflict(format!(
                "bike {} is already booked from {} to {}",
                req.bike_id, existing.from_date, existing.to_date
            )));
        }

        let days = rental_days(req.from_date, req.to_date);
        let total_amount = bike.price_per_day * days as f64;
        let id = ident::booking_id(|candidate| bookings.iter().any(|b| b.id == candidate));

        let booking = Booking {
            id,
            customer: req.customer,
            bike_id: req.bike_id,
            pickup_location: req.pickup_location,
            from_date: req.from_date,
            to_date: req.to_date,
            total_amount,
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        };
        bookings.push(booking.clone());
        self.store.save_bookings(&bookings)?;
        Ok(booking)
    }

    /// Apply a status transition on behalf of `actor`.
    ///
    /// Approve and reject require an admin; payment (Approved -> Completed)
    /// requires the owning customer. Rejection restores the bike's
    /// availability, payment clears it.
    pub fn set_status(
        &self,
        booking_id: &str,
        new_status: BookingStatus,
        actor: &User,
    ) -> Result<Booking> {
        let mut bookings = self.store.load_bookings();
        let booking = bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| Error::not_found("booking", booking_id))?;

        match new_status {
            BookingStatus::Approved | BookingStatus::Rejected => {
                if !actor.is_admin() {
                    return Err(Error::validation(
                        "only an admin can approve or reject bookings",
                    ));
                }
            }
            BookingStatus::Completed => match actor {
                User::Admin(_) => {
                    return Err(Error::validation(
                        "only the booking's customer can make payment",
                    ));
                }
                // Hide foreign bookings rather than admit they exist
                User::Customer(c) if c.username != booking.customer => {
                    return Err(Error::not_found("booking", booking_id));
                }
                User::Customer(_) => {}
            },
            BookingStatus::Pending => {
                return Err(Error::InvalidTransition {
                    from: booking.status,
                    to: new_status,
                });
            }
        }

        if !booking.status.can_transition_to(new_status) {
            return Err(Error::InvalidTransition {
                from: booking.status,
                to: new_status,
            });
        }

        booking.status = new_status;
        let updated = booking.clone();
        self.store.save_bookings(&bookings)?;

        let inventory = InventoryManager::new(self.store);
        match new_status {
            BookingStatus::Rejected => {
                inventory.set_availability(&updated.bike_id, true)?;
            }
            BookingStatus::Completed => {
                inventory.set_availability(&updated.bike_id, false)?;
            }
            _ => {}
        }

        Ok(updated)
    }

    /// Find a booking by id. With `owner` set, bookings belonging to other
    /// customers are reported as not found.
    pub fn find_booking(&self, id: &str, owner: Option<&str>) -> Result<Booking> {
        self.store
            .load_bookings()
            .into_iter()
            .find(|b| b.id == id && owner.map_or(true, |o| b.customer == o))
            .ok_or_else(|| Error::not_found("booking", id))
    }

    pub fn list_bookings(&self, filter: &BookingFilter) -> Vec<Booking> {
        self.store
            .load_bookings()
            .into_iter()
            .filter(|b| {
                filter
                    .customer
                    .as_ref()
                    .map_or(true, |c| &b.customer == c)
            })
            .filter(|b| filter.status.map_or(true, |s| b.status == s))
            .collect()
    }
}

/// Inclusive day count of a date range
pub fn rental_days(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days() + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::inventory::{BikeFilter, NewBike};
    use crate::models::{Admin, Credential, Customer};
    use tempfile::TempDir;

    fn test_store() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let storage = StorageConfig {
            data_dir: dir.path().to_path_buf(),
            ..StorageConfig::default()
        };
        (dir, Store::new(storage))
    }

    fn admin() -> User {
        User::Admin(Admin {
            username: "admin".to_string(),
            credential: Credential::new("admin123"),
        })
    }

    fn customer(username: &str) -> User {
        User::Customer(Customer {
            username: username.to_string(),
            credential: Credential::new("secret"),
            name: String::new(),
            phone: String::new(),
            email: String::new(),
        })
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn add_bike(store: &Store, location: &str, price: f64) -> String {
        InventoryManager::new(store)
            .add_bike(NewBike {
                name: "Yamaha R15".to_string(),
                color: "Blue".to_string(),
                plate_number: "MH01AB1234".to_string(),
                price_per_day: price,
                location: location.to_string(),
            })
            .unwrap()
            .id
    }

    fn request(bike_id: &str, from: &str, to: &str) -> BookingRequest {
        BookingRequest {
            customer: "alice".to_string(),
            bike_id: bike_id.to_string(),
            pickup_location: "Downtown".to_string(),
            from_date: date(from),
            to_date: date(to),
        }
    }

    const TODAY: &str = "2024-01-01";

    #[test]
    fn test_create_booking_computes_inclusive_amount() {
        let (_dir, store) = test_store();
        let bike_id = add_bike(&store, "Downtown", 25.0);
        let manager = BookingManager::new(&store);

        let booking = manager
            .create_booking_as_of(request(&bike_id, "2024-01-01", "2024-01-03"), date(TODAY))
            .unwrap();

        assert_eq!(booking.total_amount, 75.0);
        assert_eq!(booking.days(), 3);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(booking.id.starts_with("BKG"));
        // Creation does not reserve the bike
        assert!(store.load_bikes()[0].available);
    }

    #[test]
    fn test_create_booking_single_day() {
        let (_dir, store) = test_store();
        let bike_id = add_bike(&store, "Downtown", 20.0);
        let manager = BookingManager::new(&store);

        let booking = manager
            .create_booking_as_of(request(&bike_id, "2024-01-05", "2024-01-05"), date(TODAY))
            .unwrap();
        assert_eq!(booking.total_amount, 20.0);
    }

    #[test]
    fn test_create_booking_rejects_reversed_dates() {
        let (_dir, store) = test_store();
        let bike_id = add_bike(&store, "Downtown", 25.0);
        let manager = BookingManager::new(&store);

        let err = manager
            .create_booking_as_of(request(&bike_id, "2024-01-03", "2024-01-01"), date(TODAY))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(store.load_bookings().is_empty());
    }

    #[test]
    fn test_create_booking_rejects_past_date() {
        let (_dir, store) = test_store();
        let bike_id = add_bike(&store, "Downtown", 25.0);
        let manager = BookingManager::new(&store);

        let err = manager
            .create_booking_as_of(request(&bike_id, "2023-12-31", "2024-01-02"), date(TODAY))
            .unwrap_err();
        assert!(err.to_string().contains("past"));
    }

    #[test]
    fn test_create_booking_rejects_wrong_location() {
        let (_dir, store) = test_store();
        let bike_id = add_bike(&store, "Uptown", 25.0);
        let manager = BookingManager::new(&store);

        let err = manager
            .create_booking_as_of(request(&bike_id, "2024-01-01", "2024-01-02"), date(TODAY))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_create_booking_location_case_insensitive() {
        let (_dir, store) = test_store();
        let bike_id = add_bike(&store, "Downtown", 25.0);
        let manager = BookingManager::new(&store);

        let mut req = request(&bike_id, "2024-01-01", "2024-01-02");
        req.pickup_location = "DOWNTOWN".to_string();
        assert!(manager.create_booking_as_of(req, date(TODAY)).is_ok());
    }

    #[test]
    fn test_create_booking_rejects_unavailable_bike() {
        let (_dir, store) = test_store();
        let bike_id = add_bike(&store, "Downtown", 25.0);
        InventoryManager::new(&store)
            .set_availability(&bike_id, false)
            .unwrap();
        let manager = BookingManager::new(&store);

        let err = manager
            .create_booking_as_of(request(&bike_id, "2024-01-01", "2024-01-02"), date(TODAY))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_create_booking_unknown_bike() {
        let (_dir, store) = test_store();
        let manager = BookingManager::new(&store);
        assert!(matches!(
            manager.create_booking_as_of(request("BIKE9999", "2024-01-01", "2024-01-02"), date(TODAY)),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_create_booking_rejects_overlapping_active_booking() {
        let (_dir, store) = test_store();
        let bike_id = add_bike(&store, "Downtown", 25.0);
        let manager = BookingManager::new(&store);

        manager
            .create_booking_as_of(request(&bike_id, "2024-01-10", "2024-01-12"), date(TODAY))
            .unwrap();

        let err = manager
            .create_booking_as_of(request(&bike_id, "2024-01-12", "2024-01-14"), date(TODAY))
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        // Disjoint range is fine
        assert!(manager
            .create_booking_as_of(request(&bike_id, "2024-01-13", "2024-01-14"), date(TODAY))
            .is_ok());
    }

    #[test]
    fn test_rejected_booking_no_longer_blocks_range() {
        let (_dir, store) = test_store();
        let bike_id = add_bike(&store, "Downtown", 25.0);
        let manager = BookingManager::new(&store);

        let first = manager
            .create_booking_as_of(request(&bike_id, "2024-01-10", "2024-01-12"), date(TODAY))
            .unwrap();
        manager
            .set_status(&first.id, BookingStatus::Rejected, &admin())
            .unwrap();

        assert!(manager
            .create_booking_as_of(request(&bike_id, "2024-01-10", "2024-01-12"), date(TODAY))
            .is_ok());
    }

    #[test]
    fn test_approve_then_pay_takes_bike() {
        let (_dir, store) = test_store();
        let bike_id = add_bike(&store, "Downtown", 25.0);
        let manager = BookingManager::new(&store);

        let booking = manager
            .create_booking_as_of(request(&bike_id, "2024-01-01", "2024-01-03"), date(TODAY))
            .unwrap();

        let approved = manager
            .set_status(&booking.id, BookingStatus::Approved, &admin())
            .unwrap();
        assert_eq!(approved.status, BookingStatus::Approved);
        assert!(store.load_bikes()[0].available);

        let paid = manager
            .set_status(&booking.id, BookingStatus::Completed, &customer("alice"))
            .unwrap();
        assert_eq!(paid.status, BookingStatus::Completed);
        assert!(!store.load_bikes()[0].available);
    }

    #[test]
    fn test_reject_restores_availability() {
        let (_dir, store) = test_store();
        let bike_id = add_bike(&store, "Downtown", 25.0);
        InventoryManager::new(&store)
            .set_availability(&bike_id, false)
            .unwrap();
        let manager = BookingManager::new(&store);

        store
            .save_bookings(&[Booking {
                id: "BKG000001".to_string(),
                customer: "alice".to_string(),
                bike_id: bike_id.clone(),
                pickup_location: "Downtown".to_string(),
                from_date: date("2024-01-01"),
                to_date: date("2024-01-03"),
                total_amount: 75.0,
                status: BookingStatus::Pending,
                created_at: Utc::now(),
            }])
            .unwrap();

        manager
            .set_status("BKG000001", BookingStatus::Rejected, &admin())
            .unwrap();
        assert!(store.load_bikes()[0].available);
    }

    #[test]
    fn test_illegal_transitions() {
        let (_dir, store) = test_store();
        let bike_id = add_bike(&store, "Downtown", 25.0);
        let manager = BookingManager::new(&store);

        let booking = manager
            .create_booking_as_of(request(&bike_id, "2024-01-01", "2024-01-03"), date(TODAY))
            .unwrap();

        // Pending cannot complete directly
        let err = manager
            .set_status(&booking.id, BookingStatus::Completed, &customer("alice"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));

        manager
            .set_status(&booking.id, BookingStatus::Rejected, &admin())
            .unwrap();

        // Terminal states admit nothing
        let err = manager
            .set_status(&booking.id, BookingStatus::Approved, &admin())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
    }

    #[test]
    fn test_role_checks() {
        let (_dir, store) = test_store();
        let bike_id = add_bike(&store, "Downtown", 25.0);
        let manager = BookingManager::new(&store);

        let booking = manager
            .create_booking_as_of(request(&bike_id, "2024-01-01", "2024-01-03"), date(TODAY))
            .unwrap();

        // Customers cannot approve
        let err = manager
            .set_status(&booking.id, BookingStatus::Approved, &customer("alice"))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        manager
            .set_status(&booking.id, BookingStatus::Approved, &admin())
            .unwrap();

        // Admins cannot pay
        let err = manager
            .set_status(&booking.id, BookingStatus::Completed, &admin())
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        // Another customer sees not-found, not a refusal
        let err = manager
            .set_status(&booking.id, BookingStatus::Completed, &customer("mallory"))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_find_booking_owner_filter() {
        let (_dir, store) = test_store();
        let bike_id = add_bike(&store, "Downtown", 25.0);
        let manager = BookingManager::new(&store);

        let booking = manager
            .create_booking_as_of(request(&bike_id, "2024-01-01", "2024-01-03"), date(TODAY))
            .unwrap();

        assert!(manager.find_booking(&booking.id, None).is_ok());
        assert!(manager.find_booking(&booking.id, Some("alice")).is_ok());
        assert!(matches!(
            manager.find_booking(&booking.id, Some("mallory")),
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            manager.find_booking("BKG999999", None),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_list_bookings_filters() {
        let (_dir, store) = test_store();
        let bike_a = add_bike(&store, "Downtown", 25.0);
        let bike_b = add_bike(&store, "Downtown", 30.0);
        let manager = BookingManager::new(&store);

        let first = manager
            .create_booking_as_of(request(&bike_a, "2024-01-01", "2024-01-03"), date(TODAY))
            .unwrap();
        let mut req = request(&bike_b, "2024-01-01", "2024-01-03");
        req.customer = "bob".to_string();
        manager.create_booking_as_of(req, date(TODAY)).unwrap();

        manager
            .set_status(&first.id, BookingStatus::Approved, &admin())
            .unwrap();

        assert_eq!(manager.list_bookings(&BookingFilter::default()).len(), 2);
        let mine = manager.list_bookings(&BookingFilter {
            customer: Some("alice".to_string()),
            status: None,
        });
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].customer, "alice");

        let pending = manager.list_bookings(&BookingFilter {
            customer: None,
            status: Some(BookingStatus::Pending),
        });
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].customer, "bob");
    }

    #[test]
    fn test_available_listing_during_pending_booking() {
        // A bike with a merely Pending booking still lists as available.
        let (_dir, store) = test_store();
        let bike_id = add_bike(&store, "Downtown", 25.0);
        let manager = BookingManager::new(&store);
        manager
            .create_booking_as_of(request(&bike_id, "2024-01-01", "2024-01-03"), date(TODAY))
            .unwrap();

        let listed = InventoryManager::new(&store).list_bikes(&BikeFilter {
            location: None,
            available_only: true,
        });
        assert_eq!(listed.len(), 1);
    }

    #[test]
    fn test_rental_days() {
        assert_eq!(rental_days(date("2024-01-01"), date("2024-01-01")), 1);
        assert_eq!(rental_days(date("2024-01-01"), date("2024-01-03")), 3);
        assert_eq!(rental_days(date("2024-01-01"), date("2024-01-31")), 31);
    }
}
