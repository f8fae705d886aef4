use std::{env, io, path::PathBuf};

use strsim::levenshtein;
use thiserror::Error;

use cashflow_config::{Config, ConfigError, ConfigManager};
use cashflow_core::{
    FlowVisibility, LatePaymentHeuristic, PredictionTable, ProjectionError, ProjectionOptions,
    TableWithHeuristic,
};
use cashflow_domain::ProjectionSnapshot;
use cashflow_storage_json::{JsonSnapshotStorage, StorageError};

use crate::cli::{
    commands,
    formatters::CliFormatters,
    output::{self, OutputPreferences},
    registry::CommandRegistry,
    style::refresh_style,
};
use crate::errors::CliError;

/// Overrides the directory holding config and default snapshots.
pub const HOME_ENV: &str = "CASHFLOW_CALENDAR_HOME";
const DEFAULT_HOME_DIR: &str = ".cashflow_calendar";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("No snapshot loaded. Use `load <path>` first.")]
    NoSnapshot,
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Projection(#[from] ProjectionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error("exit requested")]
    ExitRequested,
}

/// A snapshot held in memory together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    pub label: String,
    pub snapshot: ProjectionSnapshot,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub storage: JsonSnapshotStorage,
    pub loaded: Option<LoadedSnapshot>,
    pub visibility: FlowVisibility,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let (base, overridden) = match env::var_os(HOME_ENV) {
            Some(path) => (PathBuf::from(path), true),
            None => {
                let home = dirs::home_dir().ok_or_else(|| {
                    CliError::Input(format!("cannot locate a home directory; set {HOME_ENV}"))
                })?;
                (home.join(DEFAULT_HOME_DIR), false)
            }
        };
        Self::with_base_dir(mode, base, overridden)
    }

    /// Builds a context rooted at `base`. With `local_snapshots`, snapshots default to
    /// `base/snapshots` instead of the documents folder.
    pub fn with_base_dir(
        mode: CliMode,
        base: PathBuf,
        local_snapshots: bool,
    ) -> Result<Self, CliError> {
        let config_manager = ConfigManager::with_base_dir(base.clone())?;
        let config = config_manager.load()?;
        let snapshot_root = match &config.snapshot_root {
            Some(root) => root.clone(),
            None if local_snapshots => base.join("snapshots"),
            None => config.resolve_snapshot_root(),
        };
        let storage = JsonSnapshotStorage::new(snapshot_root)?;

        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let context = Self {
            mode,
            registry,
            config_manager,
            config,
            storage,
            loaded: None,
            visibility: FlowVisibility::default(),
            last_command: None,
            running: true,
        };
        context.apply_output_preferences();
        Ok(context)
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn prompt(&self) -> String {
        match &self.loaded {
            Some(loaded) => format!("cashflow [{}]> ", loaded.label),
            None => "cashflow> ".to_string(),
        }
    }

    pub fn snapshot(&self) -> Result<&ProjectionSnapshot, CommandError> {
        self.loaded
            .as_ref()
            .map(|loaded| &loaded.snapshot)
            .ok_or(CommandError::NoSnapshot)
    }

    pub fn projection_options(&self) -> ProjectionOptions {
        ProjectionOptions {
            max_window_days: self.config.max_window_days,
            overdue_policy: self.config.overdue_policy,
        }
    }

    /// Predictions stored in the snapshot, backed by the late-payment heuristic.
    pub fn predictor(&self) -> Result<TableWithHeuristic, CommandError> {
        let snapshot = self.snapshot()?;
        Ok(TableWithHeuristic {
            table: PredictionTable::new(snapshot.predictions.clone()),
            heuristic: LatePaymentHeuristic {
                delay_days: self.config.heuristic_delay_days,
            },
        })
    }

    pub fn formatters(&self) -> CliFormatters {
        CliFormatters::from_config(&self.config)
    }

    pub fn persist_config(&self) -> Result<(), CommandError> {
        self.config_manager.save(&self.config)?;
        self.apply_output_preferences();
        Ok(())
    }

    fn apply_output_preferences(&self) {
        output::set_preferences(OutputPreferences {
            color_enabled: self.config.ui_color_enabled,
        });
        refresh_style();
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some(handler) = self.registry.handler(command) else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };
        match handler(self, args) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, input), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::hint(format!("Did you mean `{name}`?"));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            CommandError::NoSnapshot => {
                output::error(CommandError::NoSnapshot);
                output::hint("Try `snapshots` to list stored snapshots.");
            }
            other => output::error(other),
        }
    }
}
