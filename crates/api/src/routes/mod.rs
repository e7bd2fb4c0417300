pub mod character;
pub mod health;
pub mod home;
