//! HTTP routes.

pub mod health;
pub mod publish;
pub mod subscribe;
