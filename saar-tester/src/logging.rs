use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes the global logger.
///
/// `--verbose` lowers the default filter to debug; `RUST_LOG` still wins.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);

    // `try_init` only fails if a logger was already set.
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_twice_is_harmless() {
        super::init(false);
        super::init(true);
    }
}
