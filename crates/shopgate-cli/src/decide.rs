//! # Decide Subcommand
//!
//! Dry-runs the gate for a single path and session state, printing the route
//! class, the outcome, and the `Location` the gateway would send. The path is
//! canonicalized first, exactly as the gateway does.

use anyhow::{bail, Result};
use clap::Args;
use shopgate_core::{canonical_path, AssetFilter, Decision, RouteClass, RouteTable, SessionState};

/// Arguments for the `shopgate decide` subcommand.
#[derive(Args, Debug)]
pub struct DecideArgs {
    /// Request path, e.g. `/checkout`. A query string is ignored.
    pub path: String,

    /// Evaluate as a signed-in visitor.
    #[arg(long)]
    pub authenticated: bool,

    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// What the gateway would do with one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The asset filter matched; the gate does not run.
    Excluded,
    /// The gate ran on a path of this class.
    Decided {
        /// Route class of the canonical path.
        class: RouteClass,
        /// Outcome for the requested session state.
        decision: Decision,
    },
}

/// Evaluate `path` the way the gateway does, minus the session lookup.
pub fn evaluate(
    table: &RouteTable,
    assets: &AssetFilter,
    path: &str,
    state: SessionState,
) -> Verdict {
    let path = canonical_path(path);
    let path = path.as_ref();
    if assets.is_excluded(path) {
        return Verdict::Excluded;
    }
    let class = table.classify(path);
    Verdict::Decided {
        class,
        decision: Decision::for_class(class, path, state),
    }
}

/// Render a verdict as text or JSON.
pub fn render_verdict(path: &str, state: SessionState, verdict: &Verdict, json: bool) -> String {
    if json {
        let value = match verdict {
            Verdict::Excluded => serde_json::json!({
                "path": path,
                "session": state.as_str(),
                "excluded": true,
            }),
            Verdict::Decided { class, decision } => serde_json::json!({
                "path": path,
                "session": state.as_str(),
                "excluded": false,
                "class": class,
                "decision": decision,
                "location": decision.location(),
            }),
        };
        return value.to_string();
    }

    match verdict {
        Verdict::Excluded => format!("{path}: excluded (asset path, gate skipped)"),
        Verdict::Decided { class, decision } => match decision.location() {
            Some(location) => format!(
                "{path} [{class}, {}]: {} -> {location}",
                state.as_str(),
                decision.as_str()
            ),
            None => format!("{path} [{class}, {}]: {}", state.as_str(), decision.as_str()),
        },
    }
}

/// Execute the decide subcommand.
pub fn run_decide(args: &DecideArgs) -> Result<u8> {
    let raw = args.path.split('?').next().unwrap_or_default();
    if !raw.starts_with('/') {
        bail!("path must start with '/': {raw:?}");
    }
    let path = canonical_path(raw);
    let path = path.as_ref();
    if path != raw {
        tracing::debug!(raw, path, "path canonicalized");
    }

    let state = if args.authenticated {
        SessionState::Authenticated
    } else {
        SessionState::Anonymous
    };

    let verdict = evaluate(
        &RouteTable::storefront(),
        &AssetFilter::storefront(),
        path,
        state,
    );
    tracing::debug!(path, session = state.as_str(), ?verdict, "evaluated");
    println!("{}", render_verdict(path, state, &verdict, args.json));
    Ok(0)
}
