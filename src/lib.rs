//! Post listing manager: a controller over a remote post resource, rendered as HTML.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
