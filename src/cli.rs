use crate::audit::Audit;
use crate::auth::{AuthManager, NewCustomer};
use crate::booking::{rental_days, BookingFilter, BookingManager, BookingRequest};
use crate::inventory::{BikeFilter, BikeUpdate, InventoryManager, NewBike};
use crate::models::{BookingStatus, User};
use crate::store::Store;
use anyhow::Result;
use chrono::NaiveDate;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::cell::RefCell;

pub struct Context {
    pub store: Store,
    pub audit: RefCell<Audit>,
}

pub fn run_repl(ctx: Context) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    banner("BIKE RENTAL SYSTEM");

    loop {
        println!("\nMAIN MENU");
        println!("1. Login");
        println!("2. Register (Customer)");
        println!("3. Exit");

        let Some(choice) = prompt(&mut rl, "\nEnter your choice (1-3): ")? else {
            break;
        };
        match choice.as_str() {
            "1" => handle_login(&ctx, &mut rl)?,
            "2" => handle_register(&ctx, &mut rl)?,
            "3" => break,
            "" => {}
            _ => println!("Invalid choice. Please try again."),
        }
    }

    println!("\nThank you for using the bike rental system. Goodbye!");
    Ok(())
}

/// Read one trimmed line. None means the user bailed out (ctrl-c/ctrl-d).
fn prompt(rl: &mut DefaultEditor, label: &str) -> Result<Option<String>> {
    match rl.readline(label) {
        Ok(line) => {
            let line = line.trim().to_string();
            if !line.is_empty() {
                let _ = rl.add_history_entry(&line);
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn banner(title: &str) {
    println!("\n{}", "=".repeat(50));
    println!("{}", title);
    println!("{}", "=".repeat(50));
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()
}

// ============================================================================
// Login and registration
// ============================================================================

fn handle_login(ctx: &Context, rl: &mut DefaultEditor) -> Result<()> {
    banner("LOGIN");

    let Some(username) = prompt(rl, "Username: ")? else {
        return Ok(());
    };
    let Some(password) = prompt(rl, "Password: ")? else {
        return Ok(());
    };

    let auth = AuthManager::new(&ctx.store);
    match auth.authenticate(&username, &password) {
        Ok(user) => {
            println!("\nLogin successful! Welcome {}!", user.username());
            let _ = ctx
                .audit
                .borrow_mut()
                .login(user.username(), user.role_str());
            match &user {
                User::Admin(_) => admin_menu(ctx, rl, &user)?,
                User::Customer(_) => customer_menu(ctx, rl, &user)?,
            }
        }
        Err(e) => {
            println!("\n{}", e);
            let _ = ctx.audit.borrow_mut().login_failed(&username);
        }
    }
    Ok(())
}

fn handle_register(ctx: &Context, rl: &mut DefaultEditor) -> Result<()> {
    banner("CUSTOMER REGISTRATION");

    let Some(username) = prompt(rl, "Enter username: ")? else {
        return Ok(());
    };
    let Some(password) = prompt(rl, "Enter password: ")? else {
        return Ok(());
    };
    let Some(name) = prompt(rl, "Enter your name: ")? else {
        return Ok(());
    };
    let Some(phone) = prompt(rl, "Enter phone number: ")? else {
        return Ok(());
    };
    let Some(email) = prompt(rl, "Enter email: ")? else {
        return Ok(());
    };

    let auth = AuthManager::new(&ctx.store);
    match auth.register_customer(NewCustomer {
        username,
        password,
        name,
        phone,
        email,
    }) {
        Ok(customer) => {
            println!("\nRegistration successful! Welcome {}!", customer.name);
            let _ = ctx.audit.borrow_mut().customer_registered(&customer.username);
            let user = User::Customer(customer);
            customer_menu(ctx, rl, &user)?;
        }
        Err(e) => println!("Registration failed: {}", e),
    }
    Ok(())
}

// ============================================================================
// Customer dashboard
// ============================================================================

fn customer_menu(ctx: &Context, rl: &mut DefaultEditor, user: &User) -> Result<()> {
    loop {
        banner("CUSTOMER DASHBOARD");
        println!("1. View Available Bikes");
        println!("2. Book a Bike");
        println!("3. View Booking Status");
        println!("4. Make Payment");
        println!("5. View My Bookings");
        println!("6. Logout");

        let Some(choice) = prompt(rl, "\nEnter your choice (1-6): ")? else {
            return Ok(());
        };
        match choice.as_str() {
            "1" => view_available_bikes(ctx, rl)?,
            "2" => book_bike(ctx, rl, user)?,
            "3" => view_booking_status(ctx, rl, user)?,
            "4" => make_payment(ctx, rl, user)?,
            "5" => view_my_bookings(ctx, user),
            "6" => {
                println!("Logging out...");
                return Ok(());
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}

fn view_available_bikes(ctx: &Context, rl: &mut DefaultEditor) -> Result<()> {
    banner("AVAILABLE BIKES");

    let Some(location) = prompt(rl, "Enter location to filter (press Enter for all): ")? else {
        return Ok(());
    };
    let filter = BikeFilter {
        location: if location.is_empty() {
            None
        } else {
            Some(location.clone())
        },
        available_only: true,
    };

    let bikes = InventoryManager::new(&ctx.store).list_bikes(&filter);
    if bikes.is_empty() {
        if location.is_empty() {
            println!("\nNo bikes available at the moment.");
        } else {
            println!("\nNo bikes available in {}", location);
        }
        return Ok(());
    }

    for bike in &bikes {
        println!("{}", bike);
    }
    println!("\nTotal available bikes: {}", bikes.len());
    Ok(())
}

fn book_bike(ctx: &Context, rl: &mut DefaultEditor, user: &User) -> Result<()> {
    banner("BOOK A BIKE");

    let Some(pickup_location) = prompt(rl, "Enter pickup location: ")? else {
        return Ok(());
    };
    let Some(from_input) = prompt(rl, "Enter from date (YYYY-MM-DD): ")? else {
        return Ok(());
    };
    let Some(to_input) = prompt(rl, "Enter to date (YYYY-MM-DD): ")? else {
        return Ok(());
    };

    let (Some(from_date), Some(to_date)) = (parse_date(&from_input), parse_date(&to_input)) else {
        println!("Error: Invalid date format. Use YYYY-MM-DD.");
        return Ok(());
    };

    let inventory = InventoryManager::new(&ctx.store);
    let available = inventory.list_bikes(&BikeFilter {
        location: Some(pickup_location.clone()),
        available_only: true,
    });
    if available.is_empty() {
        println!("\nNo bikes available in {}", pickup_location);
        return Ok(());
    }

    println!("\nAvailable bikes in {}:", pickup_location);
    for (i, bike) in available.iter().enumerate() {
        println!("{}. {}", i + 1, bike);
    }

    let Some(selection) = prompt(rl, "\nSelect bike number to book: ")? else {
        return Ok(());
    };
    let bike = match selection.parse::<usize>() {
        Ok(n) if (1..=available.len()).contains(&n) => &available[n - 1],
        Ok(_) => {
            println!("Invalid bike number.");
            return Ok(());
        }
        Err(_) => {
            println!("Invalid input. Please enter a number.");
            return Ok(());
        }
    };

    let days = rental_days(from_date, to_date).max(0);
    println!("\nBooking Summary:");
    println!("Bike: {}", bike.name);
    println!("Rental Period: {} days", days);
    println!("Price per day: ${}", bike.price_per_day);
    println!("Total Amount: ${:.2}", bike.price_per_day * days as f64);

    let Some(confirm) = prompt(rl, "\nConfirm booking? (yes/no): ")? else {
        return Ok(());
    };
    if confirm.to_lowercase() != "yes" {
        println!("Booking cancelled.");
        return Ok(());
    }

    let manager = BookingManager::new(&ctx.store);
    match manager.create_booking(BookingRequest {
        customer: user.username().to_string(),
        bike_id: bike.id.clone(),
        pickup_location,
        from_date,
        to_date,
    }) {
        Ok(booking) => {
            println!("\nBooking successful!");
            println!("Your Booking ID: {}", booking.id);
            println!("Status: Pending (Waiting for admin approval)");
            let _ = ctx.audit.borrow_mut().booking_created(
                &booking.id,
                &booking.bike_id,
                &booking.customer,
                booking.total_amount,
            );
        }
        Err(e) => println!("Booking declined: {}", e),
    }
    Ok(())
}

fn view_booking_status(ctx: &Context, rl: &mut DefaultEditor, user: &User) -> Result<()> {
    banner("VIEW BOOKING STATUS");

    let Some(booking_id) = prompt(rl, "Enter your Booking ID: ")? else {
        return Ok(());
    };

    let manager = BookingManager::new(&ctx.store);
    match manager.find_booking(&booking_id, Some(user.username())) {
        Ok(booking) => {
            println!("\n{}", "-".repeat(50));
            println!("{}", booking);
            println!("{}", "-".repeat(50));
        }
        Err(e) => println!("{}", e),
    }
    Ok(())
}

fn make_payment(ctx: &Context, rl: &mut DefaultEditor, user: &User) -> Result<()> {
    banner("MAKE PAYMENT");

    let Some(booking_id) = prompt(rl, "Enter Booking ID: ")? else {
        return Ok(());
    };

    let manager = BookingManager::new(&ctx.store);
    let booking = match manager.find_booking(&booking_id, Some(user.username())) {
        Ok(booking) => booking,
        Err(e) => {
            println!("{}", e);
            return Ok(());
        }
    };

    if booking.status != BookingStatus::Approved {
        println!(
            "Cannot make payment. Booking status is: {}",
            booking.status.as_str()
        );
        return Ok(());
    }

    println!("\nPayment Details:");
    println!("Booking ID: {}", booking.id);
    println!("Amount to pay: ${:.2}", booking.total_amount);

    println!("\nSelect payment method:");
    println!("1. Credit Card");
    println!("2. Debit Card");
    println!("3. PayPal");
    println!("4. Cancel");

    let Some(choice) = prompt(rl, "\nEnter choice (1-4): ")? else {
        return Ok(());
    };
    let method = match choice.as_str() {
        "1" => "Credit Card",
        "2" => "Debit Card",
        "3" => "PayPal",
        _ => {
            println!("Payment cancelled.");
            return Ok(());
        }
    };

    println!("\nProcessing {} payment...", method);
    match manager.set_status(&booking.id, BookingStatus::Completed, user) {
        Ok(paid) => {
            println!("Payment successful!");
            println!("Booking {} is now completed.", paid.id);
            let _ = ctx.audit.borrow_mut().booking_status(
                &paid.id,
                BookingStatus::Approved,
                BookingStatus::Completed,
            );
            let _ = ctx.audit.borrow_mut().availability_set(&paid.bike_id, false);
        }
        Err(e) => println!("Payment failed: {}", e),
    }
    Ok(())
}

fn view_my_bookings(ctx: &Context, user: &User) {
    banner("MY BOOKINGS");

    let bookings = BookingManager::new(&ctx.store).list_bookings(&BookingFilter {
        customer: Some(user.username().to_string()),
        status: None,
    });
    if bookings.is_empty() {
        println!("You have no bookings yet.");
        return;
    }

    for booking in &bookings {
        println!("\n{}", "-".repeat(50));
        println!("{}", booking);
        println!("{}", "-".repeat(50));
    }
}

// ============================================================================
// Admin dashboard
// ============================================================================

fn admin_menu(ctx: &Context, rl: &mut DefaultEditor, user: &User) -> Result<()> {
    loop {
        banner("ADMIN DASHBOARD");
        println!("1. Add Bike");
        println!("2. View All Bikes");
        println!("3. Update Bike Details");
        println!("4. Delete Bike");
        println!("5. View All Bookings");
        println!("6. Approve/Reject Bookings");
        println!("7. View All Customers");
        println!("8. Logout");

        let Some(choice) = prompt(rl, "\nEnter your choice (1-8): ")? else {
            return Ok(());
        };
        match choice.as_str() {
            "1" => add_bike(ctx, rl)?,
            "2" => view_all_bikes(ctx),
            "3" => update_bike(ctx, rl)?,
            "4" => delete_bike(ctx, rl)?,
            "5" => view_all_bookings(ctx),
            "6" => manage_bookings(ctx, rl, user)?,
            "7" => view_all_customers(ctx),
            "8" => {
                println!("Logging out...");
                return Ok(());
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}

fn add_bike(ctx: &Context, rl: &mut DefaultEditor) -> Result<()> {
    banner("ADD NEW BIKE");

    let Some(name) = prompt(rl, "Enter bike name: ")? else {
        return Ok(());
    };
    let Some(color) = prompt(rl, "Enter bike color: ")? else {
        return Ok(());
    };
    let Some(plate_number) = prompt(rl, "Enter plate number: ")? else {
        return Ok(());
    };
    let Some(price_input) = prompt(rl, "Enter price per day ($): ")? else {
        return Ok(());
    };
    let Ok(price_per_day) = price_input.parse::<f64>() else {
        println!("Invalid price. Please enter a number.");
        return Ok(());
    };
    let Some(location) = prompt(rl, "Enter location: ")? else {
        return Ok(());
    };

    let inventory = InventoryManager::new(&ctx.store);
    match inventory.add_bike(NewBike {
        name,
        color,
        plate_number,
        price_per_day,
        location,
    }) {
        Ok(bike) => {
            println!("\nBike '{}' added successfully!", bike.name);
            println!("Bike ID: {}", bike.id);
            let _ = ctx.audit.borrow_mut().bike_added(&bike.id, &bike.name);
        }
        Err(e) => println!("Could not add bike: {}", e),
    }
    Ok(())
}

fn view_all_bikes(ctx: &Context) {
    banner("ALL BIKES");

    let bikes = InventoryManager::new(&ctx.store).list_bikes(&BikeFilter::default());
    if bikes.is_empty() {
        println!("No bikes in the system.");
        return;
    }

    for bike in &bikes {
        println!("{}", bike);
    }
    println!("\nTotal bikes: {}", bikes.len());
}

fn update_bike(ctx: &Context, rl: &mut DefaultEditor) -> Result<()> {
    banner("UPDATE BIKE DETAILS");

    let Some(bike_id) = prompt(rl, "Enter Bike ID to update: ")? else {
        return Ok(());
    };

    let inventory = InventoryManager::new(&ctx.store);
    let bike = match inventory.get_bike(&bike_id) {
        Ok(bike) => bike,
        Err(e) => {
            println!("{}", e);
            return Ok(());
        }
    };

    println!("\nCurrent details of {}:", bike.id);
    println!("{}", bike);
    println!("\nEnter new details (press Enter to keep current):");

    let mut update = BikeUpdate::default();

    let Some(name) = prompt(rl, &format!("Name [{}]: ", bike.name))? else {
        return Ok(());
    };
    if !name.is_empty() {
        update.name = Some(name);
    }

    let Some(color) = prompt(rl, &format!("Color [{}]: ", bike.color))? else {
        return Ok(());
    };
    if !color.is_empty() {
        update.color = Some(color);
    }

    let Some(plate) = prompt(rl, &format!("Plate number [{}]: ", bike.plate_number))? else {
        return Ok(());
    };
    if !plate.is_empty() {
        update.plate_number = Some(plate);
    }

    let Some(price) = prompt(rl, &format!("Price per day [{}]: ", bike.price_per_day))? else {
        return Ok(());
    };
    if !price.is_empty() {
        match price.parse::<f64>() {
            Ok(value) => update.price_per_day = Some(value),
            Err(_) => println!("Invalid price. Price not updated."),
        }
    }

    let Some(location) = prompt(rl, &format!("Location [{}]: ", bike.location))? else {
        return Ok(());
    };
    if !location.is_empty() {
        update.location = Some(location);
    }

    match inventory.update_bike(&bike_id, update) {
        Ok(updated) => {
            println!("\nBike {} updated successfully!", updated.id);
            let _ = ctx.audit.borrow_mut().bike_updated(&updated.id);
        }
        Err(e) => println!("Could not update bike: {}", e),
    }
    Ok(())
}

fn delete_bike(ctx: &Context, rl: &mut DefaultEditor) -> Result<()> {
    banner("DELETE BIKE");

    let Some(bike_id) = prompt(rl, "Enter Bike ID to delete: ")? else {
        return Ok(());
    };

    let inventory = InventoryManager::new(&ctx.store);
    let bike = match inventory.get_bike(&bike_id) {
        Ok(bike) => bike,
        Err(e) => {
            println!("{}", e);
            return Ok(());
        }
    };

    println!("\nBike to delete:");
    println!("{}", bike);

    let Some(confirm) = prompt(rl, "\nAre you sure you want to delete this bike? (yes/no): ")?
    else {
        return Ok(());
    };
    if confirm.to_lowercase() != "yes" {
        println!("Deletion cancelled.");
        return Ok(());
    }

    match inventory.delete_bike(&bike_id) {
        Ok(()) => {
            println!("\nBike {} deleted successfully!", bike_id);
            let _ = ctx.audit.borrow_mut().bike_deleted(&bike_id);
        }
        Err(e) => println!("Could not delete bike: {}", e),
    }
    Ok(())
}

fn view_all_bookings(ctx: &Context) {
    banner("ALL BOOKINGS");

    let bookings = BookingManager::new(&ctx.store).list_bookings(&BookingFilter::default());
    if bookings.is_empty() {
        println!("No bookings in the system.");
        return;
    }

    for booking in &bookings {
        println!("\n{}", "-".repeat(50));
        println!("{}", booking);
        println!("{}", "-".repeat(50));
    }
    println!("\nTotal bookings: {}", bookings.len());
}

fn manage_bookings(ctx: &Context, rl: &mut DefaultEditor, user: &User) -> Result<()> {
    banner("MANAGE BOOKINGS");

    let manager = BookingManager::new(&ctx.store);
    let pending = manager.list_bookings(&BookingFilter {
        customer: None,
        status: Some(BookingStatus::Pending),
    });
    if pending.is_empty() {
        println!("No pending bookings.");
        return Ok(());
    }

    println!("\nPENDING BOOKINGS:");
    for (i, booking) in pending.iter().enumerate() {
        println!("\n{}. {} - Customer: {}", i + 1, booking.id, booking.customer);
        println!(
            "   Bike ID: {} | Amount: ${:.2}",
            booking.bike_id, booking.total_amount
        );
    }

    let Some(selection) = prompt(rl, "\nSelect booking number to manage (0 to cancel): ")? else {
        return Ok(());
    };
    let booking = match selection.parse::<usize>() {
        Ok(0) => return Ok(()),
        Ok(n) if n <= pending.len() => &pending[n - 1],
        Ok(_) => {
            println!("Invalid selection.");
            return Ok(());
        }
        Err(_) => {
            println!("Invalid input. Please enter a number.");
            return Ok(());
        }
    };

    println!("\nBooking Details:");
    println!("{}", booking);

    println!("\nSelect action:");
    println!("1. Approve");
    println!("2. Reject");
    println!("3. Cancel");

    let Some(action) = prompt(rl, "\nEnter action (1-3): ")? else {
        return Ok(());
    };
    let new_status = match action.as_str() {
        "1" => BookingStatus::Approved,
        "2" => BookingStatus::Rejected,
        _ => {
            println!("Action cancelled.");
            return Ok(());
        }
    };

    match manager.set_status(&booking.id, new_status, user) {
        Ok(updated) => {
            match updated.status {
                BookingStatus::Approved => println!("\nBooking {} approved!", updated.id),
                _ => println!("\nBooking {} rejected!", updated.id),
            }
            let _ = ctx.audit.borrow_mut().booking_status(
                &updated.id,
                BookingStatus::Pending,
                updated.status,
            );
            if updated.status == BookingStatus::Rejected {
                let _ = ctx.audit.borrow_mut().availability_set(&updated.bike_id, true);
            }
        }
        Err(e) => println!("Could not update booking: {}", e),
    }
    Ok(())
}

fn view_all_customers(ctx: &Context) {
    banner("ALL CUSTOMERS");

    let customers = AuthManager::new(&ctx.store).list_customers();
    if customers.is_empty() {
        println!("No registered customers.");
        return;
    }

    for customer in &customers {
        println!("\nUsername: {}", customer.username);
        println!("Name: {}", customer.name);
        println!("Phone: {}", customer.phone);
        println!("Email: {}", customer.email);
    }
    println!("\nTotal customers: {}", customers.len());
}
