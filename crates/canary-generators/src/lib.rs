//! Canary Generators
//!
//! Resource-level building blocks for traffic-shifted Lambda releases.
//!
//! # Core Concepts
//!
//! - [`ResourceKind`]: Closed set of resource kinds that can invoke a function
//! - [`locator`]: Finds resources pointing at a function, per kind
//! - [`rewriter`]: Redirects those pointers to an alias, per kind
//! - [`code_deploy`], [`lambda`], [`iam`]: Synthesize the CodeDeploy
//!   application, deployment groups, aliases and roles
//!
//! # Example
//!
//! ```rust,ignore
//! use canary_generators::{locator, rewriter};
//!
//! for location in locator::locate_events(&template, "HelloLambdaFunction") {
//!     let rewritten = rewriter::rewrite(location.resource, &location, "HelloLambdaFunctionAliasLive")?;
//!     patch.replace(location.logical_id, rewritten);
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod api_gateway;
pub mod code_deploy;
mod error;
pub mod iam;
mod kind;
pub mod lambda;
pub mod locator;
pub mod rewriter;

// Re-exports
pub use code_deploy::{Alarm, DeploymentGroupParams, DeploymentType};
pub use error::GenerateError;
pub use kind::ResourceKind;
pub use lambda::{AliasParams, TrafficShifting};
pub use locator::{Location, PointerForm, PointerSite};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
