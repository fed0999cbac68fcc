pub mod hyperbrowser_client;
pub mod pangram_client;
pub mod url_processor;

pub use hyperbrowser_client::*;
pub use pangram_client::*;
pub use url_processor::*;
