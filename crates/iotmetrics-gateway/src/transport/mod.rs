//! HTTP transport concerns shared by every route.

pub mod cors;
