use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

// ============================================================================
// Bikes
// ============================================================================

/// A rental bike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bike {
    pub id: String,
    pub name: String,
    pub color: String,
    pub plate_number: String,
    pub price_per_day: f64,
    pub location: String,
    pub available: bool,
}

impl std::fmt::Display for Bike {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = if self.available { "Available" } else { "Rented" };
        write!(
            f,
            "ID: {} | {} ({}) | Plate: {} | ${}/day | Location: {} | Status: {}",
            self.id,
            self.name,
            self.color,
            self.plate_number,
            self.price_per_day,
            self.location,
            status
        )
    }
}

// ============================================================================
// Bookings
// ============================================================================

/// Status of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BookingStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Completed => "Completed",
        }
    }

    /// Rejected and Completed admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Completed)
    }

    /// Active bookings block bike deletion
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }

    /// Legal transitions: Pending -> Approved | Rejected, Approved -> Completed
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
                | (Self::Approved, Self::Completed)
        )
    }
}

/// A bike rental booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    /// Username of the customer who placed the booking
    pub customer: String,
    pub bike_id: String,
    pub pickup_location: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    /// Computed once at creation, never recomputed
    pub total_amount: f64,
    #[serde(default)]
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Inclusive day count of the rental period
    pub fn days(&self) -> i64 {
        (self.to_date - self.from_date).num_days() + 1
    }

    /// Whether the rental period overlaps another inclusive date range
    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.from_date <= to && from <= self.to_date
    }
}

impl std::fmt::Display for Booking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Booking ID: {}\nCustomer: {}\nBike ID: {}\nPickup: {}\nFrom: {} To: {}\nTotal: ${:.2}\nStatus: {}",
            self.id,
            self.customer,
            self.bike_id,
            self.pickup_location,
            self.from_date,
            self.to_date,
            self.total_amount,
            self.status.as_str()
        )
    }
}

// ============================================================================
// Users
// ============================================================================

/// Salted SHA-256 password credential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub salt: String,
    pub hash: String,
}

impl Credential {
    pub fn new(password: &str) -> Self {
        let salt: u128 = rand::thread_rng().gen();
        let salt = format!("{:032x}", salt);
        let hash = Self::digest(&salt, password);
        Self { salt, hash }
    }

    pub fn verify(&self, password: &str) -> bool {
        Self::digest(&self.salt, password) == self.hash
    }

    fn digest(salt: &str, password: &str) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// An administrator account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    pub username: String,
    pub credential: Credential,
}

/// A customer account with optional profile details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub username: String,
    pub credential: Credential,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

/// A user account, discriminated by the `kind` tag field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum User {
    Admin(Admin),
    Customer(Customer),
}

impl User {
    pub fn username(&self) -> &str {
        match self {
            User::Admin(a) => &a.username,
            User::Customer(c) => &c.username,
        }
    }

    pub fn credential(&self) -> &Credential {
        match self {
            User::Admin(a) => &a.credential,
            User::Customer(c) => &c.credential,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, User::Admin(_))
    }

    pub fn role_str(&self) -> &'static str {
        match self {
            User::Admin(_) => "admin",
            User::Customer(_) => "customer",
        }
    }
}
