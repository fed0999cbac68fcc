pub mod default_route;
pub mod process_route;
