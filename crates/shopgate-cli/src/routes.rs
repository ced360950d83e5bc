//! # Routes Subcommand
//!
//! Prints the tables compiled into the gate.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use shopgate_core::{AssetFilter, RouteTable};

/// Arguments for the `shopgate routes` subcommand.
#[derive(Args, Debug)]
pub struct RoutesArgs {
    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct RoutesReport<'a> {
    protected: &'a [String],
    auth_only: &'a [String],
    asset_prefixes: &'a [String],
    asset_suffixes: &'a [String],
}

/// Render the route tables.
pub fn render_routes(table: &RouteTable, assets: &AssetFilter, json: bool) -> Result<String> {
    if json {
        let report = RoutesReport {
            protected: table.protected(),
            auth_only: table.auth_only(),
            asset_prefixes: assets.prefixes(),
            asset_suffixes: assets.suffixes(),
        };
        return Ok(serde_json::to_string_pretty(&report)?);
    }

    let mut out = String::new();
    section(&mut out, "protected (prefix match)", table.protected());
    section(&mut out, "auth-only (exact match)", table.auth_only());
    section(&mut out, "asset prefixes (gate skipped)", assets.prefixes());
    section(&mut out, "asset suffixes (gate skipped)", assets.suffixes());
    Ok(out)
}

fn section(out: &mut String, title: &str, entries: &[String]) {
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(title);
    out.push_str(":\n");
    for entry in entries {
        out.push_str("  ");
        out.push_str(entry);
        out.push('\n');
    }
}

/// Execute the routes subcommand.
pub fn run_routes(args: &RoutesArgs) -> Result<u8> {
    let output = render_routes(&RouteTable::storefront(), &AssetFilter::storefront(), args.json)?;
    print!("{output}");
    if args.json {
        println!();
    }
    Ok(0)
}
