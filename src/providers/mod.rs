pub mod exchange;
pub mod util;
