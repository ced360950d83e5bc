#![deny(missing_docs)]

//! # shopgate-core — Access Gate Domain
//!
//! Pure, I/O-free logic behind the storefront's session-gated route access
//! control. Request paths are first folded by [`canonical_path`]; every path
//! that survives the [`AssetFilter`] is classified by the [`RouteTable`] and
//! turned into a [`Decision`] by [`decide`].
//!
//! ## Evaluation Order
//!
//! ```text
//! canonical_path
//!      │
//!      ▼
//! AssetFilter ─excluded─▶ pass through (gate never runs)
//!      │
//!      ▼
//! RouteTable::classify ─▶ decide(class, SessionState) ─▶ Decision
//! ```
//!
//! ## Crate Policy
//!
//! - No async, no HTTP types. The session lookup and the response rendering
//!   live in `shopgate-session` and `shopgate-api`.
//! - Decisions are deterministic: the same `(path, SessionState)` pair always
//!   yields the same [`Decision`].

pub mod asset;
pub mod error;
pub mod gate;
pub mod path;
pub mod redirect;
pub mod route;

pub use asset::AssetFilter;
pub use error::RouteError;
pub use gate::{decide, Decision, SessionState};
pub use path::canonical_path;
pub use redirect::{
    login_redirect, return_path_from_query, sanitize_return_path, HOME_PATH, LOGIN_PATH,
    REDIRECT_PARAM,
};
pub use route::{RouteClass, RouteTable};
