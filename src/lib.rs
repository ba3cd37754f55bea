//! Card Unlock - Stripe Checkout bridge for unlocking a paid game card.
//!
//! A client starts a purchase with `POST /create-checkout-session`, Stripe
//! reports the completed payment to `POST /webhook`, and the client polls
//! `GET /card-status` to learn whether the card is unlocked.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod startup;
pub mod telemetry;
