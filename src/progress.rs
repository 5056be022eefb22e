use std::io::{IsTerminal, Write};
use std::sync::Arc;

use crate::downloader::ProgressFn;

/// Returns the default progress function.
///
/// On a terminal it redraws a single stderr line while the asset streams; when
/// stderr is redirected it only logs the finished download at debug level.
pub fn default_progress_fn() -> ProgressFn {
    let interactive = std::io::stderr().is_terminal();
    Arc::new(move |name: &str, current: u64, total: u64, mib_per_sec: f64, complete: bool| {
        let current_mib = current as f64 / (1024.0 * 1024.0);
        let total_mib = total as f64 / (1024.0 * 1024.0);

        if !interactive {
            if complete {
                tracing::debug!(
                    asset = name,
                    bytes = current,
                    "download finished ({mib_per_sec:.2} MiB/s)"
                );
            }
            return;
        }

        let mut err = std::io::stderr().lock();
        if complete {
            let _ = write!(err, "\r\x1b[K");
        } else {
            let _ = write!(
                err,
                "\r\x1b[K      {name}: {current_mib:.1} MiB of {total_mib:.1} MiB ({mib_per_sec:.2} MiB/s)"
            );
        }
        let _ = err.flush();
    })
}
