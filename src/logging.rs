use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

/// Routes engine diagnostics to stderr at `level`; `None` keeps the engine silent.
/// A subscriber installed earlier by the host application wins.
pub fn init(level: Option<Level>) -> Result<()> {
    let Some(level) = level else {
        return Ok(());
    };
    let _ = fmt()
        .compact()
        .with_target(false)
        .with_level(true)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}

pub fn level_from_verbosity(verbose: bool) -> Option<Level> {
    verbose.then_some(Level::DEBUG)
}
