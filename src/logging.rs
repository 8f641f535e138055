use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};

/// Log to a file in the state directory. The TUI owns the terminal while
/// browsing, so nothing may write to stdout.
pub fn initialize(dir: &Path) {
    let path = dir.join("geier.log");
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();
    match File::create(&path) {
        Ok(file) => {
            let _ = WriteLogger::init(LevelFilter::Info, config, file);
        }
        Err(err) => {
            eprintln!("Warning: could not create log file at {}: {}", path.display(), err);
        }
    }
}
