//! nbmdeploy - Update center deployment for NetBeans module packages.
//!
//! This library provides the pieces needed to publish `.nbm` packages into a
//! snapshotted update center tree and regenerate its `updates.xml` catalog.
//!
//! # Overview
//!
//! A deployment run:
//! 1. Inspects incoming and already published packages ([`package`])
//! 2. Decides which packages supersede existing ones ([`resolver`])
//! 3. Copies the current release into a new snapshot ([`updatecenter`])
//! 4. Rebuilds, validates and compresses the catalog ([`catalog`])
//! 5. Repoints the release symlink at the new snapshot
//!
//! [`deploy::Deployer`] runs these steps in order and stops at the first
//! failure, leaving the published release untouched.

pub mod catalog;
pub mod config;
pub mod deploy;
pub mod logging;
pub mod package;
pub mod report;
pub mod resolver;
pub mod updatecenter;
pub mod xml;

#[cfg(test)]
pub(crate) mod testing;
