//! Request handlers

pub mod groups;
pub mod organizations;
pub mod pages;
pub mod users;
pub mod verification;
