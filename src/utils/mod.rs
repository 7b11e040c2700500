pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{has_image_extension, is_valid_url, resolve_url, url_path};
