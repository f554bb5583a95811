//! Pokedex battle client built on tui-dispatch.
//!
//! The library exposes the client's modules so the session machine can be
//! driven from tests without a terminal.

pub mod action;
pub mod api;
pub mod catalog;
pub mod config;
pub mod detail;
pub mod effect;
pub mod error;
pub mod gateway;
pub mod protocol;
pub mod reducer;
pub mod session;
pub mod state;
pub mod ui;
