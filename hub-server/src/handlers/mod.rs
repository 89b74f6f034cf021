//! HTTP handlers

pub mod health;
pub mod search;
pub mod catalog;
pub mod webhook;
