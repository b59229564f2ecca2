// Repositories module - data access layer

pub mod database;
pub mod dinner_repository;
pub mod food_repository;


pub use database::{connect, connect_in_memory, ping, run_migrations};
pub use dinner_repository::{DinnerRepository, SqliteDinnerRepository};
pub use food_repository::{FoodRepository, SqliteFoodRepository};
