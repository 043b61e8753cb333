use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::Registry;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::reload;
use tracing_subscriber::util::SubscriberInitExt;

/// File name prefix for the daily log; tracing-appender suffixes the date,
/// giving one file per calendar day (e.g. `mirror_sync.log.2025-11-03`).
const LOG_FILE_PREFIX: &str = "mirror_sync.log";

/// `timestamp - LEVEL - message`, the same line shape on console and file.
struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        write!(
            writer,
            "{} - {} - ",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Handle to the process-wide logger.
///
/// The subscriber is installed once, defensively at INFO before the config is
/// read so early failures are captured; [`Logging::upgrade`] raises (or
/// restates) the level once the configured verbosity is known. The worker
/// guard must stay alive for the whole run or buffered file output is lost.
pub struct Logging {
    handle: reload::Handle<LevelFilter, Registry>,
    _guard: WorkerGuard,
}

pub fn init(log_dir: &Path, verbose: bool) -> Result<Logging> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("cannot create log directory {}", log_dir.display()))?;
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);
    let (filter, handle) = reload::Layer::new(level_for(verbose));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().event_format(LineFormat).with_writer(std::io::stdout))
        .with(
            fmt::layer()
                .event_format(LineFormat)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("logging setup failed: {e}"))?;
    Ok(Logging { handle, _guard: guard })
}

impl Logging {
    /// Reconfigure the minimum severity; the new level holds for the rest of
    /// the run.
    pub fn upgrade(&self, verbose: bool) {
        let _ = self.handle.reload(level_for(verbose));
    }
}

fn level_for(verbose: bool) -> LevelFilter {
    if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO }
}
