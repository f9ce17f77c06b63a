pub mod io_traits;
pub mod join;
pub mod loader;
pub mod sink;
