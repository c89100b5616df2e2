//! # zonealarm-domain
//!
//! Pure domain model for the zonealarm time-triggered scheduler.
//!
//! ## Responsibilities
//! - Foundational types: zone/slot identifiers, error conventions, wall-clock values
//! - Define **Alarms** (weekly or calendar schedules with a time of day and an action)
//! - Define **Zones** (fixed-capacity slot arenas with a debounce watermark)
//! - Define the **Registry** (every zone of the deployment)
//! - Define the **Zone data store** (opaque payloads keyed by zone and slot)
//! - Define **Firings** (what a zone sink receives when an alarm matches)
//! - Contain all invariant enforcement and matching logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod alarm;
pub mod firing;
pub mod registry;
pub mod zone;
pub mod zone_data;
