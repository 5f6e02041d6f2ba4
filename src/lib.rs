//! Dalil - contact form and algorithm catalog for the Dalil learning site
//!
//! This crate implements the client-side behaviour of the Dalil site: a
//! contact form guarded by a sliding-window rate limiter persisted in local
//! storage, the status messages that follow a submission, and the algorithm
//! catalog rendered on the detail pages.

pub mod config;
pub mod content;
pub mod error;
pub mod form;
pub mod page;
pub mod presenter;
pub mod ratelimit;
pub mod schedule;
pub mod storage;
pub mod theme;
