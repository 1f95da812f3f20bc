use crate::errors::{Error, Result};
use crate::ident;
use crate::models::Bike;
use crate::store::Store;

/// Fields for a new bike; the id is generated on add
#[derive(Debug, Clone)]
pub struct NewBike {
    pub name: String,
    pub color: String,
    pub plate_number: String,
    pub price_per_day: f64,
    pub location: String,
}

/// Partial update: only provided fields overwrite
#[derive(Debug, Clone, Default)]
pub struct BikeUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub plate_number: Option<String>,
    pub price_per_day: Option<f64>,
    pub location: Option<String>,
}

/// Listing filter. Customer-facing views set `available_only`;
/// admin views show everything.
#[derive(Debug, Clone, Default)]
pub struct BikeFilter {
    pub location: Option<String>,
    pub available_only: bool,
}

/// Bike CRUD and availability management over the store.
pub struct InventoryManager<'a> {
    store: &'a Store,
}

impl<'a> InventoryManager<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub fn add_bike(&self, new: NewBike) -> Result<Bike> {
        validate_price(new.price_per_day)?;

        let mut bikes = self.store.load_bikes();
        let id = ident::bike_id(|candidate| bikes.iter().any(|b| b.id == candidate));
        let bike = Bike {
            id,
            name: new.name,
            color: new.color,
            plate_number: new.plate_number,
            price_per_day: new.price_per_day,
            location: new.location,
            available: true,
        };
        bikes.push(bike.clone());
        self.store.save_bikes(&bikes)?;
        Ok(bike)
    }

    pub fn list_bikes(&self, filter: &BikeFilter) -> Vec<Bike> {
        self.store
            .load_bikes()
            .into_iter()
            .filter(|b| !filter.available_only || b.available)
            .filter(|b| {
                filter
                    .location
                    .as_ref()
                    .map_or(true, |loc| b.location.eq_ignore_ascii_case(loc))
            })
            .collect()
    }

    pub fn get_bike(&self, id: &str) -> Result<Bike> {
        self.store
            .load_bikes()
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(|| Error::not_found("bike", id))
    }

    pub fn update_bike(&self, id: &str, update: BikeUpdate) -> Result<Bike> {
        if let Some(price) = update.price_per_day {
            validate_price(price)?;
        }

        let mut bikes = self.store.load_bikes();
        let bike = bikes
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| Error::not_found("bike", id))?;

        if let Some(name) = update.name {
            bike.name = name;
        }
        if let Some(color) = update.color {
            bike.color = color;
        }
        if let Some(plate_number) = update.plate_number {
            bike.plate_number = plate_number;
        }
        if let Some(price) = update.price_per_day {
            bike.price_per_day = price;
        }
        if let Some(location) = update.location {
            bike.location = location;
        }

        let updated = bike.clone();
        self.store.save_bikes(&bikes)?;
        Ok(updated)
    }

    /// Delete a bike. Blocked while any Pending or Approved booking
    /// references it; Completed and Rejected bookings do not block.
    pub fn delete_bike(&self, id: &str) -> Result<()> {
        let mut bikes = self.store.load_bikes();
        if !bikes.iter().any(|b| b.id == id) {
            return Err(Error::not_found("bike", id));
        }

        let active = self
            .store
            .load_bookings()
            .iter()
            .filter(|b| b.bike_id == id && b.status.is_active())
            .count();
        if active > 0 {
            return Err(Error::conflict(format!(
                "cannot delete bike {}: it has {} active booking(s)",
                id, active
            )));
        }

        bikes.retain(|b| b.id != id);
        self.store.save_bikes(&bikes)?;
        Ok(())
    }

    /// Idempotent availability flip, used by the booking manager on
    /// rejection and payment.
    pub fn set_availability(&self, id: &str, available: bool) -> Result<Bike> {
        let mut bikes = self.store.load_bikes();
        let bike = bikes
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| Error::not_found("bike", id))?;
        bike.available = available;
        let updated = bike.clone();
        self.store.save_bikes(&bikes)?;
        Ok(updated)
    }

    /// Install the demo fleet into an empty bike slot. Returns the number
    /// of bikes seeded (zero when the slot already has bikes).
    pub fn seed_demo_fleet(&self) -> Result<usize> {
        let bikes = self.store.load_bikes();
        if !bikes.is_empty() {
            return Ok(0);
        }

        let fleet = demo_fleet();
        let count = fleet.len();
        self.store.save_bikes(&fleet)?;
        Ok(count)
    }
}

fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::validation(
            "price per day must be a non-negative number",
        ));
    }
    Ok(())
}

fn demo_fleet() -> Vec<Bike> {
    let rows = [
        ("BIKE0001", "Yamaha R15", "Blue", "MH01AB1234", 25.0, "Downtown"),
        ("BIKE0002", "Royal Enfield Classic 350", "Black", "MH02CD5678", 35.0, "Uptown"),
        ("BIKE0003", "Honda CB Shine", "Red", "MH03EF9012", 20.0, "Suburbs"),
        ("BIKE0004", "Bajaj Pulsar 150", "White", "MH04GH3456", 22.0, "Downtown"),
        ("BIKE0005", "KTM Duke 200", "Orange", "MH05IJ7890", 30.0, "Uptown"),
    ];
    rows.iter()
        .map(|(id, name, color, plate, price, location)| Bike {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            plate_number: plate.to_string(),
            price_per_day: *price,
            location: location.to_string(),
            available: true,
        })
        .collect()
}
