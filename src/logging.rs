use log::LevelFilter;
use simplelog::ColorChoice;
use simplelog::ConfigBuilder;
use simplelog::TermLogger;
use simplelog::TerminalMode;

pub fn level_filter(verbosity: usize, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Warn;
    }
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the terminal logger. Only the first call has an effect.
pub fn init(verbosity: usize, quiet: bool) {
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Trace)
        .build();
    // Fails only if a logger is already installed.
    let _ = TermLogger::init(
        level_filter(verbosity, quiet),
        config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
}

#[cfg(test)]
mod tests {
    use log::LevelFilter;

    use super::level_filter;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_filter(0, false), LevelFilter::Info);
        assert_eq!(level_filter(1, false), LevelFilter::Debug);
        assert_eq!(level_filter(3, false), LevelFilter::Trace);
        assert_eq!(level_filter(2, true), LevelFilter::Warn);
    }
}
