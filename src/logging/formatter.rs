use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::Layer as LayerTrait,
    registry::LookupSpan,
};

use crate::logging::config::{ConsoleConfig, LogFormat};

/// Presentation switches shared by the console and file layers.
#[derive(Debug, Clone, Copy)]
pub struct LayerOptions {
    pub with_ansi: bool,
    pub with_target: bool,
    pub with_thread_ids: bool,
    pub with_line_numbers: bool,
}

impl From<&ConsoleConfig> for LayerOptions {
    fn from(console: &ConsoleConfig) -> Self {
        Self {
            with_ansi: console.with_ansi,
            with_target: console.with_target,
            with_thread_ids: console.with_thread_ids,
            with_line_numbers: console.with_line_numbers,
        }
    }
}

/// Builds a formatting layer writing to `writer`.
///
/// Returns a boxed trait object to erase the concrete format type
/// (json/pretty/compact).
pub fn build_layer<S, W>(
    format: LogFormat,
    options: LayerOptions,
    writer: W,
) -> Box<dyn LayerTrait<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => Box::new(
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_writer(writer)
                .with_ansi(false)
                .with_target(options.with_target)
                .with_thread_ids(options.with_thread_ids)
                .with_line_number(options.with_line_numbers),
        ),
        LogFormat::Pretty => Box::new(
            fmt::layer()
                .pretty()
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(writer)
                .with_ansi(options.with_ansi)
                .with_target(options.with_target)
                .with_thread_ids(options.with_thread_ids)
                .with_line_number(options.with_line_numbers),
        ),
        LogFormat::Compact => Box::new(
            fmt::layer()
                .compact()
                .with_writer(writer)
                .with_ansi(options.with_ansi)
                .with_target(options.with_target)
                .with_thread_ids(options.with_thread_ids)
                .with_line_number(options.with_line_numbers),
        ),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use tracing_subscriber::{prelude::*, registry::Registry};

    use super::*;

    /// In-memory writer for asserting on formatted output.
    #[derive(Clone, Default)]
    pub(crate) struct BufferWriter(Arc<Mutex<Vec<u8>>>);

    impl BufferWriter {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for BufferWriter {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = BufferWriter;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn options() -> LayerOptions {
        LayerOptions {
            with_ansi: false,
            ..LayerOptions::from(&ConsoleConfig::default())
        }
    }

    /// Тест проверяет, что json-слой пишет поля события в JSON.
    #[test]
    fn test_json_layer_writes_fields() {
        let writer = BufferWriter::default();
        let layer = build_layer::<Registry, _>(LogFormat::Json, options(), writer.clone());
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(document = 3, "Document loaded");
        });

        let out = writer.contents();
        let line: serde_json::Value = serde_json::from_str(out.lines().next().unwrap()).unwrap();
        assert_eq!(line["fields"]["message"], "Document loaded");
        assert_eq!(line["fields"]["document"], 3);
    }

    #[test]
    fn test_compact_and_pretty_layers_write() {
        for format in [LogFormat::Compact, LogFormat::Pretty] {
            let writer = BufferWriter::default();
            let layer = build_layer::<Registry, _>(format, options(), writer.clone());
            let subscriber = Registry::default().with(layer);
            tracing::subscriber::with_default(subscriber, || {
                tracing::warn!("anchor table full");
            });
            assert!(writer.contents().contains("anchor table full"));
        }
    }
}
