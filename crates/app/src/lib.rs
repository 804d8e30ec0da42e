//! Host layer: prompt catalog, record stores, and the concrete user
//! flows (login, registration, medicine schedule, alarm response) built
//! on the Vaani engine crates.

pub mod config;
pub mod demo;
pub mod flows;
pub mod prompts;
pub mod records;
