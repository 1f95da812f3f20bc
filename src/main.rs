mod audit;
mod auth;
mod booking;
mod cli;
mod config;
mod errors;
mod ident;
mod inventory;
mod models;
mod store;

use anyhow::Result;
use clap::Parser;
use std::cell::RefCell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "velo", about = "A bike rental management CLI")]
pub struct Args {
    #[arg(long, help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "VELO_DATA_DIR", help = "Data directory override")]
    pub data_dir: Option<PathBuf>,

    #[arg(long, env = "VELO_AUDIT_DIR", help = "Audit log directory override")]
    pub audit_dir: Option<PathBuf>,

    #[arg(long, help = "Disable the audit log")]
    pub no_audit: bool,

    #[arg(long, help = "Debug output (print resolved configuration)")]
    pub debug: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut cfg = if let Some(config_path) = &args.config {
        config::Config::load_from(config_path)?
    } else {
        config::Config::load()?
    };

    // Apply CLI overrides
    if let Some(dir) = &args.data_dir {
        cfg.storage.data_dir = dir.clone();
    }
    if let Some(dir) = &args.audit_dir {
        cfg.audit.dir = dir.clone();
    }
    if args.no_audit {
        cfg.audit.enabled = false;
    }

    if let Err(errors) = cfg.validate() {
        for err in &errors {
            eprintln!("Config error: {}", err);
        }
        return Err(anyhow::anyhow!("invalid configuration"));
    }

    if args.debug {
        eprintln!("[DEBUG] Data dir: {}", cfg.storage.data_dir.display());
        eprintln!(
            "[DEBUG] Audit: {} ({})",
            if cfg.audit.enabled { "on" } else { "off" },
            cfg.audit.dir.display()
        );
    }

    let session_id = uuid::Uuid::new_v4().to_string();
    let mut audit = if cfg.audit.enabled {
        std::fs::create_dir_all(&cfg.audit.dir)?;
        let audit_path = cfg.audit.dir.join(format!("{}.jsonl", session_id));
        audit::Audit::new(&audit_path, &session_id)?
    } else {
        audit::Audit::disabled(&session_id)
    };

    let store = store::Store::new(cfg.storage.clone());

    // First-run bootstrap: default admin, and the demo fleet if configured
    let auth = auth::AuthManager::new(&store);
    if auth.ensure_default_admin(&cfg.bootstrap)? {
        let seeded = if cfg.bootstrap.seed_demo_fleet {
            inventory::InventoryManager::new(&store).seed_demo_fleet()?
        } else {
            0
        };
        let _ = audit.bootstrap(&cfg.bootstrap.admin_username, seeded);
    }

    let ctx = cli::Context {
        store,
        audit: RefCell::new(audit),
    };
    cli::run_repl(ctx)
}
