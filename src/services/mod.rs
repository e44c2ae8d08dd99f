// src/services/mod.rs

//! Services that talk to the disclosure portal.

mod disclosure;

pub use disclosure::{Disclosure, DisclosureFetcher, DisclosureGateway, MopsGateway};
