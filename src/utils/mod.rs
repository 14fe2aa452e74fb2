pub mod timestamp;
pub use timestamp::{to_file_stamp, to_iso_string};
