//! # Return-Path Subcommand
//!
//! Shows where the login page would send a visitor for a given `redirect`
//! value. Off-site and malformed values collapse to `/`.

use anyhow::Result;
use clap::Args;
use shopgate_core::{return_path_from_query, sanitize_return_path};

/// Arguments for the `shopgate return-path` subcommand.
#[derive(Args, Debug)]
pub struct ReturnPathArgs {
    /// Raw `redirect` value, already percent-decoded.
    pub raw: Option<String>,

    /// Treat the value as a full query string (`redirect=%2Fcheckout&x=1`).
    #[arg(long)]
    pub query: bool,
}

/// Resolve the return path for the given arguments.
pub fn resolve(args: &ReturnPathArgs) -> String {
    if args.query {
        return_path_from_query(args.raw.as_deref())
    } else {
        sanitize_return_path(args.raw.as_deref())
    }
}

/// Execute the return-path subcommand.
pub fn run_return_path(args: &ReturnPathArgs) -> Result<u8> {
    let resolved = resolve(args);
    if args.raw.as_deref().is_some_and(|raw| !args.query && raw != resolved) {
        tracing::info!(raw = ?args.raw, "return path rejected, using home");
    }
    println!("{resolved}");
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: Option<&str>, query: bool) -> ReturnPathArgs {
        ReturnPathArgs {
            raw: raw.map(str::to_string),
            query,
        }
    }

    #[test]
    fn local_path_is_kept() {
        assert_eq!(resolve(&args(Some("/checkout"), false)), "/checkout");
    }

    #[test]
    fn off_site_value_collapses_home() {
        assert_eq!(resolve(&args(Some("//evil.example"), false)), "/");
        assert_eq!(resolve(&args(Some("https://evil.example"), false)), "/");
    }

    #[test]
    fn missing_value_is_home() {
        assert_eq!(resolve(&args(None, false)), "/");
    }

    #[test]
    fn query_mode_decodes_parameter() {
        assert_eq!(
            resolve(&args(Some("redirect=%2Forders%2F9&utm=x"), true)),
            "/orders/9"
        );
    }
}
