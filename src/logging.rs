//! Browser Logging
//!
//! `tracing` output formatted by `tracing-subscriber` and written to the
//! devtools console, one `console.log` call per event.

use std::io;

use tracing_subscriber::fmt::MakeWriter;

/// Buffers one formatted event and flushes it to the console on drop
pub struct ConsoleLine {
    buf: Vec<u8>,
}

impl io::Write for ConsoleLine {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleLine {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buf);
        web_sys::console::log_1(&line.trim_end().into());
    }
}

#[derive(Clone, Copy, Default)]
struct WebConsole;

impl<'a> MakeWriter<'a> for WebConsole {
    type Writer = ConsoleLine;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleLine { buf: Vec::new() }
    }
}

/// Install the global subscriber. Timestamps are left to the devtools.
pub fn init() {
    let result = tracing_subscriber::fmt()
        .with_writer(WebConsole)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
    if let Err(e) = result {
        web_sys::console::warn_1(&format!("[LOG] subscriber not installed: {}", e).into());
    }
}
