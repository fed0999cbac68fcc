pub mod process_request;
pub mod process_response;

pub use process_request::*;
pub use process_response::*;
