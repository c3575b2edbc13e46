use std::panic;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Logging knobs shared by every alumni binary.
///
/// - `ALUMNI_LOG_DIR`: write daily-rotated `<dir>/<app>.log` files instead of stdout
/// - `ALUMNI_LOG_INCLUDE_BACKTRACE`: also run the default panic hook (`1`/`true`)
/// - `RUST_LOG`: filter directives, `default_filter` when unset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub log_dir: Option<PathBuf>,
    pub include_backtrace: bool,
    pub default_filter: String,
    /// Console output goes to stderr, keeping stdout free for command output.
    pub stderr: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            log_dir: None,
            include_backtrace: false,
            default_filter: "info".to_string(),
            stderr: false,
        }
    }
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var_os("ALUMNI_LOG_DIR").map(PathBuf::from),
            std::env::var("ALUMNI_LOG_INCLUDE_BACKTRACE").ok().as_deref(),
        )
    }

    fn from_vars(log_dir: Option<PathBuf>, include_backtrace: Option<&str>) -> Self {
        Self {
            log_dir: log_dir.filter(|dir| !dir.as_os_str().is_empty()),
            include_backtrace: include_backtrace
                .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            ..Self::default()
        }
    }
}

/// Routes panics through `tracing` so they land in the same sink as other
/// logs. Installed at most once per process.
pub fn install_tracing_panic_hook(app_name: &'static str, settings: &LogSettings) {
    static INSTALLED: OnceLock<()> = OnceLock::new();
    let include_backtrace = settings.include_backtrace;

    INSTALLED.get_or_init(|| {
        let default_hook = panic::take_hook();

        panic::set_hook(Box::new(move |info| {
            let thread = std::thread::current();
            let location = info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()));
            let message = info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".into());

            tracing::error!(
                application = app_name,
                thread = thread.name().unwrap_or("unnamed"),
                location = location.as_deref().unwrap_or("unknown"),
                panic_message = %message,
                "panic"
            );

            if include_backtrace {
                default_hook(info);
            }
        }));
    });
}

fn file_writer(app_name: &str, dir: &Path) -> Option<BoxMakeWriter> {
    if let Err(err) = std::fs::create_dir_all(dir) {
        eprintln!("cannot create log directory {}: {err}; logging to stdout", dir.display());
        return None;
    }

    let appender = tracing_appender::rolling::daily(dir, format!("{app_name}.log"));
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);
    Some(BoxMakeWriter::new(writer))
}

/// Installs the global subscriber. Repeated calls are ignored.
pub fn init_tracing(app_name: &'static str, settings: &LogSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.default_filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let writer = settings
        .log_dir
        .as_ref()
        .and_then(|dir| file_writer(app_name, dir))
        .or_else(|| settings.stderr.then(|| BoxMakeWriter::new(std::io::stderr)));

    match writer {
        Some(writer) => {
            let _ = builder.with_writer(writer).try_init();
        }
        None => {
            let _ = builder.try_init();
        }
    }

    install_tracing_panic_hook(app_name, settings);
}
