use paths::PathContext;
use settings::SettingsStore;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing_subscriber::{
    Layer, filter::LevelFilter, filter::filter_fn, fmt, layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Application infrastructure context.
///
/// Paths, version, the settings store and the logging guard.
pub struct AppContext {
    pub path_context: PathContext,
    pub version: &'static str,
    settings: SettingsStore,
    /// Keeps the non-blocking file writer alive; dropping it flushes the log.
    _log_guard: tracing_appender::non_blocking::WorkerGuard,
}

impl AppContext {
    pub fn app_id(&self) -> &str {
        self.path_context.app_id()
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn path_context(&self) -> &PathContext {
        &self.path_context
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }
}

/// Application metadata: identity constants only.
pub trait Application: Sized + 'static {
    const APP_ID: &'static str;
    const STUDIO: &'static str = "chicken105";
    const PROJECT_ID: &'static str = "stud_book";
}

/// Builder performing the common bootstrap.
pub struct AppBuilder<A: Application> {
    context: AppContext,
    _marker: PhantomData<A>,
}

impl<A: Application> AppBuilder<A> {
    /// Bootstraps with the default base path.
    ///
    /// Debug builds keep their data in `<workspace>/.out`, release builds in
    /// the platform data directory.
    pub fn new(version: &'static str) -> Result<Self, BoxError> {
        #[cfg(debug_assertions)]
        let path_context = PathContext::with_base_path(
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("..")
                .join("..")
                .join(".out"),
            A::STUDIO,
            A::PROJECT_ID,
            A::APP_ID,
        );
        #[cfg(not(debug_assertions))]
        let path_context = PathContext::new(A::STUDIO, A::PROJECT_ID, A::APP_ID);

        Self::from_path_context(path_context, version)
    }

    /// Bootstraps below an explicit base directory.
    pub fn with_base_path(base: impl Into<PathBuf>, version: &'static str) -> Result<Self, BoxError> {
        let path_context =
            PathContext::with_base_path(base.into(), A::STUDIO, A::PROJECT_ID, A::APP_ID);
        Self::from_path_context(path_context, version)
    }

    fn from_path_context(path_context: PathContext, version: &'static str) -> Result<Self, BoxError> {
        path_context.ensure_directories()?;
        let guard = init_logging(&path_context)?;

        let settings = SettingsStore::builder()
            .with_settings_file(path_context.settings_file())
            .build()?;

        tracing::info!(
            app = A::APP_ID,
            version,
            settings = %path_context.settings_file().display(),
            "application initialized"
        );

        Ok(Self {
            context: AppContext {
                path_context,
                version,
                settings,
                _log_guard: guard,
            },
            _marker: PhantomData,
        })
    }

    pub fn build_simple(self) -> AppContext {
        self.context
    }
}

/// File (non-blocking) + console layers; INFO in debug, WARN in release.
///
/// A subscriber installed earlier (e.g. by another test) stays in place;
/// the file writer is still created so the guard is valid.
fn init_logging(
    path_context: &PathContext,
) -> Result<tracing_appender::non_blocking::WorkerGuard, BoxError> {
    let log_file_path = path_context.log_file_now();
    let log_dir = log_file_path
        .parent()
        .ok_or("log file path has no parent directory")?;
    let log_filename = log_file_path
        .file_name()
        .ok_or("log file path has no file name")?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    #[cfg(debug_assertions)]
    let level = LevelFilter::INFO;

    #[cfg(not(debug_assertions))]
    let level = LevelFilter::WARN;

    let file_layer = fmt::Layer::default()
        .with_target(false)
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_filter(filter_fn(move |metadata| metadata.level() <= &level));

    let console_layer = fmt::Layer::default()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter_fn(move |metadata| metadata.level() <= &level));

    // Tests und eingebettete Aufrufer setzen oft schon einen globalen Subscriber
    if let Err(err) = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
    {
        tracing::debug!(%err, "global subscriber already set, keeping it");
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use settings::Settings;

    struct TestApp;

    impl Application for TestApp {
        const APP_ID: &'static str = "test_app";
    }

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    #[serde(default)]
    struct Counter {
        runs: u32,
    }

    impl Settings for Counter {
        const SECTION: &'static str = "counter";
    }

    #[test]
    fn bootstrap_creates_layout_and_settings_store() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = AppBuilder::<TestApp>::with_base_path(tmp.path(), "0.0.1")
            .unwrap()
            .build_simple();

        assert_eq!(ctx.app_id(), "test_app");
        assert_eq!(ctx.version(), "0.0.1");
        assert!(ctx.path_context().logs_dir().is_dir());
        assert_eq!(
            ctx.settings().file_path(),
            ctx.path_context().settings_file().as_path()
        );

        ctx.settings().register::<Counter>().unwrap();
        ctx.settings().update::<Counter, _>(|c| c.runs += 1).unwrap();
        assert!(ctx.path_context().settings_file().exists());
    }

    #[test]
    fn second_bootstrap_keeps_the_first_subscriber() {
        let first_dir = tempfile::tempdir().unwrap();
        let second_dir = tempfile::tempdir().unwrap();
        let first = AppBuilder::<TestApp>::with_base_path(first_dir.path(), "0.0.1")
            .unwrap()
            .build_simple();
        let second = AppBuilder::<TestApp>::with_base_path(second_dir.path(), "0.0.2")
            .unwrap()
            .build_simple();

        assert_eq!(first.version(), "0.0.1");
        assert_eq!(second.version(), "0.0.2");
        assert!(second.path_context().logs_dir().is_dir());
    }
}
