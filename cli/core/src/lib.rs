pub mod domains;
pub mod logging;
