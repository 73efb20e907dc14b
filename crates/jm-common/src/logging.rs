use std::any::Any;
use std::panic;
use std::path::PathBuf;
use std::sync::{Once, OnceLock};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Logging knobs read from the environment.
///
/// - `JM_LOG_DIR`: write `<dir>/<app>.log` with daily rotation instead of stderr
/// - `JM_LOG_INCLUDE_BACKTRACE`: also run the default panic hook (prints backtraces)
/// - `RUST_LOG`: filter directives, `info` when unset or invalid
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogSettings {
    pub dir: Option<PathBuf>,
    pub include_backtrace: bool,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self {
            dir: std::env::var_os("JM_LOG_DIR")
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
            include_backtrace: std::env::var("JM_LOG_INCLUDE_BACKTRACE")
                .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

/// Text carried by a panic payload (`panic!("...")` yields `&str` or `String`).
fn panic_payload_text(payload: &(dyn Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Log panics, including ones on scoring pool threads, as `error!` events.
/// Only the first call installs the hook.
pub fn install_tracing_panic_hook(app_name: &'static str) {
    static HOOK: Once = Once::new();

    HOOK.call_once(|| {
        let settings = LogSettings::from_env();
        let previous = panic::take_hook();

        panic::set_hook(Box::new(move |info| {
            let current = std::thread::current();
            let origin = match info.location() {
                Some(loc) => format!("{}:{}", loc.file(), loc.line()),
                None => "<unknown>".to_string(),
            };

            tracing::error!(
                app = app_name,
                thread = current.name().unwrap_or("<unnamed>"),
                origin = %origin,
                panic_message = panic_payload_text(info.payload()),
                "thread panicked"
            );

            if settings.include_backtrace {
                previous(info);
            }
        }));
    });
}

/// Daily-rotated `<dir>/<app>.log`, or `None` when no usable log directory is configured.
fn file_writer(app_name: &'static str, settings: &LogSettings) -> Option<BoxMakeWriter> {
    let dir = settings.dir.as_ref()?;
    if let Err(err) = std::fs::create_dir_all(dir) {
        eprintln!("{app_name}: cannot create log dir {}: {err}; logging to stderr", dir.display());
        return None;
    }

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, format!("{app_name}.log")));
    // The guard flushes on drop; keep it for the life of the process.
    LOG_GUARD.get_or_init(|| guard);
    Some(BoxMakeWriter::new(writer))
}

/// Install the global subscriber. Calling it again after a subscriber is set is a no-op.
pub fn init_tracing_subscriber(app_name: &'static str) {
    let settings = LogSettings::from_env();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    if let Some(writer) = file_writer(app_name, &settings) {
        let _ = builder.with_ansi(false).with_writer(writer).try_init();
    } else {
        // stdout carries command output
        let _ = builder.with_writer(std::io::stderr).try_init();
    }
}
