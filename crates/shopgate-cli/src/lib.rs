//! # shopgate-cli — Access Gate Inspection Tool
//!
//! Offline view of the policy the gateway enforces. Nothing here talks to a
//! session provider; the session state is given on the command line.
//!
//! ## Subcommands
//!
//! - `shopgate routes`: print the protected, auth-only, and asset tables.
//! - `shopgate decide`: dry-run the gate for one path.
//! - `shopgate return-path`: show what a `redirect` parameter resolves to.
//!
//! ```bash
//! shopgate decide /checkout
//! shopgate decide /auth/signup --authenticated --json
//! shopgate return-path //evil.example
//! ```

pub mod decide;
pub mod return_path;
pub mod routes;
