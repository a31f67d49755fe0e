//! Client library for the name-match ticket board.
//!
//! Users register an identity, create show ticket entries, search them and
//! leave comments whose visibility the backend enforces.
//! - [`identity`] keeps the local user id/name pair.
//! - [`client`] talks to the REST backend.
//! - [`controller`] turns commands into requests and results into view state.
//! - [`view`] renders that state into a `Fragment` tree.

pub mod client;
pub mod config;
pub mod controller;
pub mod identity;
pub mod mentions;
pub mod models;
pub mod utils;
pub mod view;

pub use client::{BoardClient, ClientError};
pub use controller::{Command, Controller, Session, Tab};
