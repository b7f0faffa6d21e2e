// logging.rs

use env_logger::{Env, Target};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;

/// Routes `log` output to `path`; the terminal belongs to the UI.
/// `RUST_LOG` picks the filter, `info` otherwise.
pub fn init(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
