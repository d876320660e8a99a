//! Horizon REST client
//!
//! Only two endpoints are used: `GET /accounts/{id}` to read sequence numbers
//! and check activation, and `POST /transactions` to submit signed envelopes.
//! The [`Horizon`] trait is the seam the builder and broadcaster depend on.

pub mod client;
pub mod errors;
pub mod models;

pub use client::{Horizon, HorizonClient};
pub use errors::HorizonError;
pub use models::{AccountRecord, ResultCodes, SubmitResponse};
