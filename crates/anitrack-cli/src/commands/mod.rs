//! Command handlers

pub mod auth;
pub mod catalog;
pub mod config;
pub mod status;
pub mod watchlist;
