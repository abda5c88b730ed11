use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive used when `RUST_LOG` is unset.
///
/// `verbose` raises the crate's level to at least DEBUG and lets other
/// crates log at INFO.
pub fn filter_directive(level: Option<Level>, verbose: bool) -> String {
    let level = level.unwrap_or(Level::INFO);
    if verbose {
        format!(
            "prime_scan={},info",
            level.max(Level::DEBUG).as_str().to_ascii_lowercase()
        )
    } else {
        format!("prime_scan={}", level.as_str().to_ascii_lowercase())
    }
}

fn default_filter(level: Option<Level>, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level, verbose)))
}

pub fn init_cli_logger(level: Option<Level>, verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(level, verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

// 結構化輸出，方便交給 log 收集器
pub fn init_json_logger(level: Option<Level>, verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(level, verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .json(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_is_info() {
        assert_eq!(filter_directive(None, false), "prime_scan=info");
        assert_eq!(filter_directive(None, true), "prime_scan=debug,info");
    }

    #[test]
    fn test_configured_level_is_honoured() {
        assert_eq!(filter_directive(Some(Level::WARN), false), "prime_scan=warn");
        assert_eq!(filter_directive(Some(Level::ERROR), false), "prime_scan=error");
        assert_eq!(filter_directive(Some(Level::TRACE), false), "prime_scan=trace");
    }

    #[test]
    fn test_verbose_never_lowers_the_level() {
        assert_eq!(filter_directive(Some(Level::WARN), true), "prime_scan=debug,info");
        assert_eq!(filter_directive(Some(Level::TRACE), true), "prime_scan=trace,info");
    }

    #[test]
    fn test_directives_parse_as_filters() {
        for level in [Level::TRACE, Level::DEBUG, Level::INFO, Level::WARN, Level::ERROR] {
            assert!(EnvFilter::try_new(filter_directive(Some(level), false)).is_ok());
        }
    }
}
