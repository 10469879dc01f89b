//! Tracing initialisation (M-LOG-STRUCTURED).
//!
//! Natively the subscriber honours `RUST_LOG` and writes to stdout. In the
//! browser there is no environment and no clock, so the filter comes from
//! the caller and lines go to `console.log` without timestamps.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// `directives` is an `EnvFilter` string such as `"ai_chat_widget=debug"`.
/// Fails if a global subscriber is already set.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_tracing(directives: &str) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
}

/// Install the global subscriber.
///
/// `directives` is an `EnvFilter` string such as `"ai_chat_widget=debug"`.
/// Fails if a global subscriber is already set.
#[cfg(target_arch = "wasm32")]
pub fn init_tracing(directives: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::new(directives))
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .without_time()
                .with_writer(console::MakeConsoleWriter),
        )
        .try_init()
}

#[cfg(target_arch = "wasm32")]
mod console {
    use std::io;

    use tracing_subscriber::fmt::MakeWriter;
    use wasm_bindgen::JsValue;

    /// Hands out one [`ConsoleWriter`] per event.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct MakeConsoleWriter;

    /// Buffers one formatted event and logs it when dropped.
    #[derive(Debug, Default)]
    pub struct ConsoleWriter {
        buf: Vec<u8>,
    }

    impl io::Write for ConsoleWriter {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.buf.extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Drop for ConsoleWriter {
        fn drop(&mut self) {
            if self.buf.is_empty() {
                return;
            }
            let line = String::from_utf8_lossy(&self.buf);
            web_sys::console::log_1(&JsValue::from_str(line.trim_end()));
        }
    }

    impl<'a> MakeWriter<'a> for MakeConsoleWriter {
        type Writer = ConsoleWriter;

        fn make_writer(&'a self) -> Self::Writer {
            ConsoleWriter::default()
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        assert!(init_tracing("ai_chat_widget=debug").is_ok());
        assert!(init_tracing("ai_chat_widget=debug").is_err());
        tracing::debug!("subscriber installed");
    }
}
