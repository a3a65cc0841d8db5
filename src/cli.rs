use clap::{Parser, Subcommand, ValueEnum};

use crate::models::user::Role;

/// roomserve — room reservation service
#[derive(Parser)]
#[command(name = "roomserve", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind (overrides ROOMSERVE_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create an admin account
    CreateAdmin {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, value_enum, default_value_t = AdminRole::Admin)]
        role: AdminRole,
    },

    /// Load the demo buildings and rooms
    Seed,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum AdminRole {
    Admin,
    SuperAdmin,
}

impl From<AdminRole> for Role {
    fn from(r: AdminRole) -> Self {
        match r {
            AdminRole::Admin => Role::Admin,
            AdminRole::SuperAdmin => Role::SuperAdmin,
        }
    }
}
