use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::models::BookingStatus;

/// Per-session JSONL audit log of state-changing operations.
///
/// When disabled, every log call is a no-op.
pub struct Audit {
    pub path: Option<PathBuf>,
    session_id: String,
    file: Option<File>,
}

#[derive(Serialize)]
struct Event<'a> {
    ts: DateTime<Utc>,
    session_id: &'a str,
    #[serde(rename = "type")]
    event_type: &'a str,
    #[serde(flatten)]
    data: serde_json::Value,
}

impl Audit {
    pub fn new(path: &Path, session_id: &str) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            session_id: session_id.to_string(),
            file: Some(file),
        })
    }

    pub fn disabled(session_id: &str) -> Self {
        Self {
            path: None,
            session_id: session_id.to_string(),
            file: None,
        }
    }

    pub fn log(&mut self, event_type: &str, data: serde_json::Value) -> Result<()> {
        let Some(file) = &mut self.file else {
            return Ok(());
        };
        let event = Event {
            ts: Utc::now(),
            session_id: &self.session_id,
            event_type,
            data,
        };
        let line = serde_json::to_string(&event)?;
        writeln!(file, "{}", line)?;
        file.flush()?;
        Ok(())
    }

    pub fn bootstrap(&mut self, admin: &str, bikes_seeded: usize) -> Result<()> {
        self.log(
            "bootstrap",
            serde_json::json!({ "admin": admin, "bikes_seeded": bikes_seeded }),
        )
    }

    pub fn login(&mut self, username: &str, role: &str) -> Result<()> {
        self.log(
            "login",
            serde_json::json!({ "username": username, "role": role }),
        )
    }

    pub fn login_failed(&mut self, username: &str) -> Result<()> {
        self.log("login_failed", serde_json::json!({ "username": username }))
    }

    pub fn customer_registered(&mut self, username: &str) -> Result<()> {
        self.log(
            "customer_registered",
            serde_json::json!({ "username": username }),
        )
    }

    pub fn bike_added(&mut self, bike_id: &str, name: &str) -> Result<()> {
        self.log(
            "bike_added",
            serde_json::json!({ "bike_id": bike_id, "name": name }),
        )
    }

    pub fn bike_updated(&mut self, bike_id: &str) -> Result<()> {
        self.log("bike_updated", serde_json::json!({ "bike_id": bike_id }))
    }

    pub fn bike_deleted(&mut self, bike_id: &str) -> Result<()> {
        self.log("bike_deleted", serde_json::json!({ "bike_id": bike_id }))
    }

    pub fn booking_created(
        &mut self,
        booking_id: &str,
        bike_id: &str,
        customer: &str,
        total_amount: f64,
    ) -> Result<()> {
        self.log(
            "booking_created",
            serde_json::json!({
                "booking_id": booking_id,
                "bike_id": bike_id,
                "customer": customer,
                "total_amount": total_amount,
            }),
        )
    }

    pub fn booking_status(
        &mut self,
        booking_id: &str,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<()> {
        self.log(
            "booking_status",
            serde_json::json!({
                "booking_id": booking_id,
                "from": from.as_str(),
                "to": to.as_str(),
            }),
        )
    }

    pub fn availability_set(&mut self, bike_id: &str, available: bool) -> Result<()> {
        self.log(
            "availability_set",
            serde_json::json!({ "bike_id": bike_id, "available": available }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_events_append_as_jsonl() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.jsonl");
        let mut audit = Audit::new(&path, "session-1").unwrap();

        audit.login("admin", "admin").unwrap();
        audit.bike_added("BIKE0001", "Yamaha R15").unwrap();
        audit
            .booking_status("BKG000001", BookingStatus::Pending, BookingStatus::Approved)
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["type"].as_str().unwrap(), "login");
        assert_eq!(first["session_id"].as_str().unwrap(), "session-1");

        let last: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(last["from"].as_str().unwrap(), "Pending");
        assert_eq!(last["to"].as_str().unwrap(), "Approved");
    }

    #[test]
    fn test_disabled_audit_writes_nothing() {
        let mut audit = Audit::disabled("session-1");
        audit.login("admin", "admin").unwrap();
        assert!(audit.path.is_none());
    }
}
