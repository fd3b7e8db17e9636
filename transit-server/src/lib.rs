//! Public transit network server.
//!
//! An in-memory model of a transit network (stations, lines, ordered
//! stop sequences) with a multi-transfer route search and a validated
//! administrative mutation surface, exposed over HTTP.

pub mod admin;
pub mod domain;
pub mod network;
pub mod planner;
pub mod store;
pub mod web;
