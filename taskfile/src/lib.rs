pub mod output;
pub mod render;

pub use output::{DEFAULT_FILE_NAME, resolve_output_path, write_task_file};
pub use render::{KILL_TIMEOUT, SUMMARY, render, write_to};
