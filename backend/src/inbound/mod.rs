//! Inbound adapters translating transport-level requests into domain calls.

pub mod http;
pub mod ws;
