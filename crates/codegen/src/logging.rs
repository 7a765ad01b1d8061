//! Logging setup for the schema compiler binary.

/// Log arguments shared by the compiler CLI.
#[derive(Debug, clap::Args)]
pub struct LogArgs {
    /// The log verbosity. Can be one of trace|debug|info|warn|error|off
    #[arg(
        long = "log.level",
        default_value_t = LogLevel::Warn,
        ignore_case = true,
        value_enum,
        global = true
    )]
    pub level: LogLevel,

    /// Log output format; defaults to color when stderr is a terminal.
    #[arg(long = "log.format", value_enum, global = true)]
    pub format: Option<LogFormat>,
}

#[derive(Debug, clap::ValueEnum, Clone, Copy)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        })
    }
}

#[derive(Debug, clap::ValueEnum, Clone, Copy)]
pub enum LogFormat {
    /// One JSON object per line, suitable for log collectors.
    Json,
    /// Plain text without colors.
    Text,
    /// Text with colors for interactive terminals.
    Color,
}

/// Initializes the tracing subscriber; diagnostics and logs both go to
/// stderr, keeping stdout clean for tooling.
pub fn init(args: &LogArgs) {
    let format = args.format.unwrap_or_else(|| {
        if atty::is(atty::Stream::Stderr) {
            LogFormat::Color
        } else {
            LogFormat::Text
        }
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(args.level.to_string()))
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.with_ansi(false).init(),
        LogFormat::Color => builder.with_ansi(true).init(),
    }
}
