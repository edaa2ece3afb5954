//! memedrop - airdrop backend for a meme-token landing page
//!
//! Participants connect a wallet, verify an email with a one-time passcode,
//! complete a fixed set of social tasks and then claim a fixed token reward.
//!
//! ## Layers
//!
//! 1. **Domain**: the session state machine (task tracker, eligibility gate,
//!    claim). Pure and synchronous.
//! 2. **Service**: loads a participant, applies one transition, stores it.
//!    Task verification and OTP delivery are pluggable collaborators.
//! 3. **API / CLI**: REST endpoints over `tiny_http` and the `memedrop` binary.

pub mod api;
pub mod config;
pub mod domain;
pub mod income;
pub mod input;
pub mod otp;
pub mod service;
pub mod store;
pub mod verifier;

pub use domain::*;
