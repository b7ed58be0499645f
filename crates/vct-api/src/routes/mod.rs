//! # Route Modules
//!
//! Each module defines the handlers of one API surface area. Routers are
//! assembled in [`crate::app`].

pub mod health;
pub mod verify;
