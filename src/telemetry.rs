//! Log subscriber setup. `LOG_LEVEL` takes an EnvFilter directive string and
//! falls back to `DEFAULT_FILTER`; `LOG_FORMAT=json` emits one JSON object per
//! event, anything else the human-readable format.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,study_assistant=debug,quiz=debug,chat=info,export=info,tower_http=info,axum=info";

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // The two builders are different types, so each branch calls init itself.
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => {
            builder.json().init();
        }
        _ => {
            builder.init();
        }
    }
}
