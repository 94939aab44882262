pub use slog::{crit, debug, error, info, o, trace, warn};
pub use slog::{Discard, Drain, Logger};

use sloggers::{Config, LoggerConfig};

/// Builds the default terminal logger used by the tools. Library code never
/// calls this; it accepts a parent logger and falls back to `Discard`.
pub fn term_logger() -> Logger {
    let config: LoggerConfig = serdeconv::from_toml_str(
        r#"
type = "terminal"
level = "debug"
destination = "stderr"
"#,
    )
    .expect("Malformed embedded logger config");

    config.build_logger().expect("Logger construction failed")
}
