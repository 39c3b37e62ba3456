use dotenvy::var;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod config;
pub mod deploy;
pub mod error;
pub mod prefix;
pub mod store;
pub mod upload;

#[macro_use]
extern crate tracing;

///exit status for a run that aborted before uploading anything
pub const EXIT_CONFIG_ERROR: u8 = 1;
///exit status for a run that finished, but where at least one file didn't make it
pub const EXIT_PARTIAL_FAILURE: u8 = 2;

pub fn setup() {
    if cfg!(debug_assertions) {
        for (key, value) in &[
            ("RUST_SPANTRACE", "full"),
            ("RUST_LIB_BACKTRACE", "full"),
            ("RUST_BACKTRACE", "full"),
            ("RUST_LOG", "info"),
        ] {
            match std::env::var(key) {
                Err(_) => {
                    trace!(%key, %value, "Setting env var");
                    //safety: called from main before the runtime (or any other thread) is started
                    unsafe { std::env::set_var(key, value) };
                }
                Ok(found) => {
                    trace!(%key, %found, "Found existing env var");
                }
            }
        }
    }

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Error finding env vars: {e:?}")
        }
    }

    //stdout is reserved for the per-file lines and the summary
    let sub = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env());

    if var("SENTRY_DSN").is_ok() {
        sub.with(sentry::integrations::tracing::layer()).init();
    } else {
        sub.init();
    }

    color_eyre::install().expect("unable to install color-eyre");
}
