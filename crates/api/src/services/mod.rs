//! Business services sitting between the routes and the repositories.

pub mod auth;
pub mod gate;
pub mod token;
