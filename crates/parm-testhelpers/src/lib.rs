//! Test helpers shared by the parm crates.

use std::io::Write;
use std::sync::Once;

use tempfile::NamedTempFile;

static TRACING: Once = Once::new();

/// Install a tracing subscriber that writes through the test harness.
///
/// Honors `RUST_LOG`; safe to call from every test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Write `contents` to a fresh temporary parameter file.
///
/// The file is deleted when the returned handle is dropped.
pub fn parm_file(contents: impl AsRef<[u8]>) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("parm-")
        .suffix(".parm")
        .tempfile()
        .expect("failed to create temporary parameter file");
    file.write_all(contents.as_ref())
        .expect("failed to write temporary parameter file");
    file.flush().expect("failed to flush temporary parameter file");
    file
}
