pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{domain_of, is_valid_url, normalize_target_url};
