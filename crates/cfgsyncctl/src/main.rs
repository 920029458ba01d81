// # cfgsyncctl - Settings Sync CLI
//
// A thin integration layer over cfgsync-core. It reads backend
// configuration from the environment, loads the settings mirror once and
// runs a single subcommand against it. Sync logic lives in cfgsync-core.
//
// ## Configuration
//
// ### Backend
// - `CFGSYNC_BACKEND_TYPE`: Backend type (memory, file, http). Default: memory
// - `CFGSYNC_FILE_PATH`: Settings file (for file)
// - `CFGSYNC_HTTP_URL`: Base URL of the settings service (for http)
// - `CFGSYNC_HTTP_TOKEN`: Bearer token (optional, for http)
// - `CFGSYNC_HTTP_TIMEOUT_SECS`: Request timeout in seconds (for http)
//
// ### Engine
// - `CFGSYNC_EVENT_CAPACITY`: Engine event channel capacity
// - `CFGSYNC_LOG_LEVEL`: trace, debug, info, warn, error. Default: info
//
// ## Example
//
// ```bash
// export CFGSYNC_BACKEND_TYPE=file
// export CFGSYNC_FILE_PATH=/var/lib/cfgsync/settings.json
//
// cfgsyncctl set show_clock false
// cfgsyncctl theme dark
// cfgsyncctl reset --exclude client_uuid
// ```

mod command;
mod config;

use anyhow::{Context, Result};
use cfgsync_core::{AppState, BackendRegistry, SettingsStore, SyncEngine, TracingThemeHost};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::command::{Cli, Command};
use crate::config::Config;

/// Exit codes for the CLI
///
/// - 0: Command completed
/// - 1: Configuration or usage error
/// - 2: Runtime error (backend unreachable, write refused)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CtlExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<CtlExitCode> for ExitCode {
    fn from(code: CtlExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                CtlExitCode::ConfigError
            } else {
                CtlExitCode::Success
            };
            // --help and --version land here too
            let _ = e.print();
            return code.into();
        }
    };

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return CtlExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return CtlExitCode::ConfigError.into();
    }

    let log_level = match config.log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration validation error: {:#}", e);
            return CtlExitCode::ConfigError.into();
        }
    };

    // Logs go to stderr so command output stays pipeable
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return CtlExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return CtlExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        tokio::select! {
            result = run(config, cli.command) => match result {
                Ok(()) => CtlExitCode::Success,
                Err(e) => {
                    error!("{:#}", e);
                    exit_code_for(&e)
                }
            },
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted");
                CtlExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Map a failed run to an exit code
///
/// Rejected or unreachable backends are runtime errors; a core error the
/// caller caused (bad value, derived field, bad config) is a usage error.
fn exit_code_for(err: &anyhow::Error) -> CtlExitCode {
    let core = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<cfgsync_core::Error>());

    match core {
        Some(e) if !e.is_backend_failure() => CtlExitCode::ConfigError,
        _ => CtlExitCode::RuntimeError,
    }
}

/// Build the engine, load the mirror and run one command
async fn run(config: Config, command: Command) -> Result<()> {
    let sync_config = config.to_sync_config()?;

    let registry = BackendRegistry::with_builtin();

    #[cfg(feature = "http")]
    cfgsync_backend_http::register(&registry);

    debug!("Available backends: {:?}", registry.list_backends());

    let backend = registry
        .create_backend(&sync_config.backend)
        .await
        .context("Failed to create backend")?;

    let store = Arc::new(SettingsStore::new());
    let app = AppState::new();

    let (engine, mut events) = SyncEngine::new(
        backend,
        store,
        Arc::new(TracingThemeHost),
        &sync_config.engine,
    )?;

    let event_logger = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!("Engine event: {:?}", event);
        }
    });

    info!("Loading settings from {} backend", engine.backend_name());
    app.set_loading(true);
    let loaded = engine.load().await;
    app.set_online(loaded.is_ok());
    loaded.context("Failed to load settings")?;

    let mut stdout = std::io::stdout().lock();
    let result = command.execute(&engine, &mut stdout).await;
    app.set_loading(false);
    debug!("Final app flags: {:?}", app.snapshot());

    drop(engine);
    let _ = event_logger.await;

    result
}
