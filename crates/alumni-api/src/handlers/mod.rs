pub mod alumni;
pub mod events;
pub mod health;
pub mod pagination;
pub mod profile;
pub mod recommendations;
