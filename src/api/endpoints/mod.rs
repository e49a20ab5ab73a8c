pub mod catalog;
pub mod corrections;
pub mod customers;
pub mod health;
pub mod orders;
