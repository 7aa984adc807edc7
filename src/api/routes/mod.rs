pub mod checks;
pub mod health;
pub mod monitors;
