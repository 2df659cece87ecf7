pub mod home_controller;
pub mod slack_controller;
