//! `hbh sanitize <name>...` – print sanitized filenames.

use hbh_core::sanitize::sanitize_item_name;

pub fn run_sanitize(names: &[String]) {
    for name in names {
        println!("{}", sanitize_item_name(name));
    }
}
