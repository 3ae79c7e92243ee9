use std::sync::Mutex;

use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter, Layer, Registry};

lazy_static! {
    static ref LOG_INITIALIZED: Mutex<bool> = Mutex::new(false);
}

/// Initialize logging.  Everything goes to stderr so that the JSON the tools
/// print on stdout stays clean.
///
/// If the environment variable `RUST_LOG` is set to a non-empty value we
/// interpret it as an `EnvFilter` and also log span enter/exit, which is handy
/// for seeing how long the build/assign/prune steps take.  Otherwise only
/// warnings (ex: duplicate catalogue rows) are shown.
///
/// Calling this more than once is harmless.
pub fn init_logging() {
    let mut initialized = match LOG_INITIALIZED.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if *initialized {
        return;
    }

    // Scripts frequently set RUST_LOG unconditionally but with an empty value,
    // which should not be interpreted as a desire to enable logging.
    let verbose_filter = std::env::var("RUST_LOG")
        .ok()
        .filter(|rustlog| !rustlog.is_empty())
        .and_then(|_| EnvFilter::try_from_default_env().ok());

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match verbose_filter {
        Some(env_filter) => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
            .compact()
            // Logs end up in files and CI output where ANSI is just noise.
            .with_ansi(false)
            // Wall time takes up a lot of columns and we rarely care.
            .without_time()
            .with_filter(env_filter)
            .boxed(),
        None => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .compact()
            .with_ansi(false)
            .without_time()
            .with_filter(EnvFilter::new("warn"))
            .boxed(),
    };

    // Another subscriber may already be installed (ex: by a test harness);
    // that's fine, we just don't get ours.
    let _ = Registry::default().with(layer).try_init();
    *initialized = true;
}
