pub mod common_options;
pub mod logging;
