//! Registration, login, and first-run account bootstrap.

use crate::config::BootstrapConfig;
use crate::errors::{Error, Result};
use crate::models::{Admin, Credential, Customer, User};
use crate::store::Store;

/// Fields for a new customer registration
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub username: String,
    pub password: String,
    pub name: String,
    pub phone: String,
    pub email: String,
}

pub struct AuthManager<'a> {
    store: &'a Store,
}

impl<'a> AuthManager<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Register a new customer account. The username must be unused.
    pub fn register_customer(&self, new: NewCustomer) -> Result<Customer> {
        if new.username.trim().is_empty() {
            return Err(Error::validation("username must not be empty"));
        }
        if new.password.is_empty() {
            return Err(Error::validation("password must not be empty"));
        }

        let mut users = self.store.load_users();
        if users.iter().any(|u| u.username() == new.username) {
            return Err(Error::conflict(format!(
                "username '{}' already exists",
                new.username
            )));
        }

        let customer = Customer {
            username: new.username,
            credential: Credential::new(&new.password),
            name: new.name,
            phone: new.phone,
            email: new.email,
        };
        users.push(User::Customer(customer.clone()));
        self.store.save_users(&users)?;
        Ok(customer)
    }

    /// Check credentials. An unknown username and a wrong password fail
    /// the same way.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        self.store
            .load_users()
            .into_iter()
            .find(|u| u.username() == username && u.credential().verify(password))
            .ok_or(Error::Unauthenticated)
    }

    /// Create the bootstrap admin when the user slot is empty.
    /// Returns true when an admin was created (first run).
    pub fn ensure_default_admin(&self, bootstrap: &BootstrapConfig) -> Result<bool> {
        let mut users = self.store.load_users();
        if !users.is_empty() {
            return Ok(false);
        }

        users.push(User::Admin(Admin {
            username: bootstrap.admin_username.clone(),
            credential: Credential::new(&bootstrap.admin_password),
        }));
        self.store.save_users(&users)?;
        Ok(true)
    }

    /// All registered customers, for the admin dashboard.
    pub fn list_customers(&self) -> Vec<Customer> {
        self.store
            .load_users()
            .into_iter()
            .filter_map(|u| match u {
                User::Customer(c) => Some(c),
                User::Admin(_) => None,
            })
            .collect()
    }
}
