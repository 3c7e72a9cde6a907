pub mod csv_loader;
pub mod prompt_loader;

pub use csv_loader::load_ibw_lsrs;
pub use prompt_loader::load_prompt;
