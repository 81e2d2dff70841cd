//! Console and per-component file logging.
//!
//! [`init`] installs the global subscriber once and hands back a
//! [`Telemetry`] handle owning the log files. Call [`Telemetry::shutdown`]
//! before exiting so buffered lines reach disk.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log targets that get a file of their own, with the file name used.
pub const COMPONENTS: [(&str, &str); 3] = [
    ("vacancy_hh::source", "source"),
    ("vacancy_hh::store", "store"),
    ("vacancy_hh::query", "query"),
];

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log level/filter '{value}': {source}")]
    EnvFilter {
        value: String,
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("cannot open log file {}: {source}", path.display())]
    LogFile { path: PathBuf, source: io::Error },

    #[error("telemetry error: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Buffered, shareable log file.
#[derive(Clone)]
pub struct LogFile {
    path: PathBuf,
    inner: Arc<Mutex<BufWriter<File>>>,
}

impl LogFile {
    /// Open `path` for appending, creating parent directories as needed.
    pub fn open(path: &Path) -> Result<Self, TelemetryError> {
        let to_error = |source: io::Error| TelemetryError::LogFile {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(to_error)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(to_error)?;

        Ok(Self {
            path: path.to_path_buf(),
            inner: Arc::new(Mutex::new(BufWriter::new(file))),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flush(&self) -> io::Result<()> {
        self.lock().flush()
    }

    fn lock(&self) -> MutexGuard<'_, BufWriter<File>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub struct LogFileWriter<'a>(MutexGuard<'a, BufWriter<File>>);

impl Write for LogFileWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogFileWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileWriter(self.lock())
    }
}

/// `2024-05-01 12:00:00,123 - store - INFO: message`
pub struct ComponentFormat {
    component: &'static str,
}

impl ComponentFormat {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }
}

impl<S, N> FormatEvent<S, N> for ComponentFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f");
        write!(
            writer,
            "{now} - {} - {}: ",
            self.component,
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Handle over the installed subscriber's log files.
pub struct Telemetry {
    files: Vec<LogFile>,
}

impl Telemetry {
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(LogFile::path)
    }

    /// Flush every component log file.
    pub fn shutdown(self) -> io::Result<()> {
        for file in &self.files {
            file.flush()?;
        }
        Ok(())
    }
}

/// Open one log file per component under `log_dir`.
pub fn open_component_files(
    log_dir: &Path,
) -> Result<Vec<(&'static str, &'static str, LogFile)>, TelemetryError> {
    COMPONENTS
        .iter()
        .map(|&(target, name)| {
            let file = LogFile::open(&log_dir.join(format!("{name}.log")))?;
            Ok((target, name, file))
        })
        .collect()
}

/// A file layer that keeps only INFO and above from `target`.
pub fn component_layer<S>(
    target: &'static str,
    component: &'static str,
    file: LogFile,
) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    tracing_subscriber::fmt::layer()
        .event_format(ComponentFormat::new(component))
        .with_ansi(false)
        .with_writer(file)
        .with_filter(Targets::new().with_target(target, Level::INFO))
        .boxed()
}

/// Install the console layer plus one file layer per component.
/// `RUST_LOG` overrides `log_level` for the console.
pub fn init(log_level: &str, log_dir: &Path) -> Result<Telemetry, TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level).map_err(|source| TelemetryError::EnvFilter {
            value: log_level.to_string(),
            source,
        })?,
    };

    let components = open_component_files(log_dir)?;
    let mut layers = Vec::with_capacity(components.len() + 1);
    layers.push(
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .compact()
            .with_filter(env_filter)
            .boxed(),
    );
    let mut files = Vec::with_capacity(components.len());
    for (target, component, file) in components {
        layers.push(component_layer(target, component, file.clone()));
        files.push(file);
    }

    tracing_subscriber::registry().with(layers).try_init()?;
    Ok(Telemetry { files })
}
