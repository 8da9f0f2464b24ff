//! # dealsync-client
//!
//! [`HttpBrokerageApi`] speaks the brokerage-accounting service's JSON:API
//! dialect over blocking HTTP and implements [`dealsync_core::BrokerageApi`].

mod client;
mod error;
mod wire;

pub use client::HttpBrokerageApi;
