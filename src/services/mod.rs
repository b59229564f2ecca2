// Services module - business logic layer

pub mod dinner_service;
pub mod food_service;

pub use dinner_service::DinnerService;
pub use food_service::FoodService;
