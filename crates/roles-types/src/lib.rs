#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Chain-agnostic types shared by the role-gated executor crates.
//!
//! - [`chain`] - CAIP-2 chain identifiers and provider registries
//! - [`networks`] - Well-known network names

pub mod chain;
pub mod networks;
