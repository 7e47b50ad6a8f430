use core::error::Error;

use log::LevelFilter;
use simple_logger::SimpleLogger;

/// Initializes the global logger writing to stderr.
///
/// Verbosity `0` maps to `Info`, `1` to `Debug` and anything above to
/// `Trace`. Only the given module (and its submodules) is raised to that
/// level, everything else stays at `Warn`.
pub fn init(module: &str, verbosity: usize) -> Result<(), Box<dyn Error>> {
    let level = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .with_module_level(module, level)
        .with_utc_timestamps()
        .init()?;

    Ok(())
}
