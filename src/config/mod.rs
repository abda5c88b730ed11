pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, LogFormat};

#[cfg(feature = "cli")]
mod cli {
    use crate::domain::model::{Bound, OutputFormat};
    use crate::domain::ports::ConfigProvider;
    use crate::utils::error::Result;
    use crate::utils::validation::{validate_positive_number, Validate};
    use clap::{Parser, ValueEnum};
    use std::time::Duration;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
    pub enum LogFormat {
        #[default]
        Compact,
        Json,
    }

    #[derive(Debug, Clone, Parser)]
    #[command(name = "prime-scan")]
    #[command(about = "Find the largest prime below a bound by trial division")]
    pub struct CliConfig {
        /// Exclusive upper bound of the search
        #[arg(long, default_value = "80000", allow_negative_numbers = true)]
        pub bound: Bound,

        /// Give up after this many seconds
        #[arg(long)]
        pub timeout_seconds: Option<u64>,

        /// Report format: text or json
        #[arg(long, default_value = "text")]
        pub format: OutputFormat,

        #[arg(long, help = "Log process CPU and memory around the scan")]
        pub monitor: bool,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
        pub log_format: LogFormat,
    }

    impl ConfigProvider for CliConfig {
        fn bound(&self) -> Bound {
            self.bound
        }

        fn timeout(&self) -> Option<Duration> {
            self.timeout_seconds.map(Duration::from_secs)
        }

        fn output_format(&self) -> OutputFormat {
            self.format
        }

        fn monitoring_enabled(&self) -> bool {
            self.monitor
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            if let Some(seconds) = self.timeout_seconds {
                validate_positive_number("timeout_seconds", seconds, 1)?;
            }
            Ok(())
        }
    }

}
