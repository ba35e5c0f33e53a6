pub mod default_route;
pub mod webhook_route;
