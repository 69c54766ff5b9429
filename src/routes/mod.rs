pub mod admin;
pub mod analytics;
pub mod batch;
pub mod health;
