//! Application layer - wires commands to the backend and the terminal
//!
//! Every action reports its own outcome as a notification. Errors returned
//! from here have already been shown to the user; the caller only uses them
//! for the exit status.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm};
use indicatif::MultiProgress;
use tracing::{info, warn};

use crate::batch::{select_files, BatchEvent, BatchOptions, BatchOrchestrator, BatchReport};
use crate::cli::{self, Commands, HistoryCommand, ModelsCommand, ThemeAction};
use crate::client::{ClassifierApi, HistoryId};
use crate::config::Config;
use crate::error::InputError;
use crate::history::{self, HistoryBrowser};
use crate::models::ModelManager;
use crate::settings;
use crate::spinner::{
    format_duration, print_kv, print_subheader, BatchProgress, PendingSpinner, StatusIcons,
};
use crate::stats::{Dashboard, Stats};
use crate::ui::{Notifier, Theme};
use crate::view::{
    sanitize, BatchItemView, CompareView, HistoryItemView, ModelItemView, Renderer,
    SelectionView, StatsPanelView,
};

/// Default export file name
pub const EXPORT_FILE_NAME: &str = "riwayat_deteksi.csv";

/// One client session against a classifier backend
pub struct App<A: ClassifierApi> {
    api: Arc<A>,
    notifier: Arc<dyn Notifier>,
    config: Config,
    config_path: PathBuf,
    dashboard: Dashboard,
    /// Chart already seeded from the stored history
    seeded: bool,
    /// Counts of the newest stored record, read while seeding
    latest_stored: Option<Stats>,
    /// Ask before destructive actions
    interactive: bool,
    /// Shared with the notifier so toasts never tear a live spinner
    progress: MultiProgress,
}

impl<A: ClassifierApi> App<A> {
    pub fn new(api: Arc<A>, notifier: Arc<dyn Notifier>, config: Config, config_path: PathBuf) -> Self {
        Self {
            api,
            notifier,
            config,
            config_path,
            dashboard: Dashboard::new(),
            seeded: false,
            latest_stored: None,
            interactive: true,
            progress: MultiProgress::new(),
        }
    }

    /// Draw spinners and bars on `progress`
    pub fn with_progress(mut self, progress: MultiProgress) -> Self {
        self.progress = progress;
        self
    }

    /// Never prompt; destructive actions then require an explicit `--yes`
    pub fn non_interactive(mut self) -> Self {
        self.interactive = false;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub(crate) fn api(&self) -> &A {
        self.api.as_ref()
    }

    pub(crate) fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    fn renderer(&self) -> Renderer {
        Renderer::new(self.config.general.theme.palette())
    }

    /// Notify the user about a failure no component reported yet
    fn surface<T, E>(&self, result: Result<T, E>, action: &str) -> Result<T>
    where
        E: Into<anyhow::Error>,
    {
        result.map_err(|e| {
            let e = e.into();
            self.notifier.error(&format!("{}: {:#}", action, e));
            e
        })
    }

    pub async fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Detect(args) => self.detect(&args.paths, args.output).await.map(|_| ()),
            Commands::Models(cmd) => self.models(cmd).await,
            Commands::Settings(args) => self.save_confidence(args.confidence).await,
            Commands::History(cmd) => self.history(cmd).await,
            Commands::Dashboard => self.show_dashboard().await,
            Commands::Theme(args) => self.theme(args.action),
            Commands::Config(args) => self.config_command(args.init),
            Commands::Interactive => cli::interactive::run_interactive_session(self).await,
        }
    }

    /// Seed the chart from stored history once per session
    async fn seed_dashboard(&mut self) {
        if self.seeded {
            return;
        }
        match self.api.history().await {
            Ok(records) => {
                history::seed_chart(&mut self.dashboard.chart, &records);
                self.latest_stored = records.first().map(|r| r.stats());
                info!("Chart seeded with {} sample(s)", self.dashboard.chart.len());
            }
            Err(e) => warn!("Could not load history for the chart: {}", e),
        }
        self.seeded = true;
    }

    // ========================================================================
    // Detection
    // ========================================================================

    /// Classify every image among `paths`, one request at a time
    pub async fn detect(&mut self, paths: &[PathBuf], output: Option<PathBuf>) -> Result<BatchReport> {
        self.seed_dashboard().await;

        let files = match select_files(paths).await {
            Ok(files) => files,
            Err(InputError::NoFiles) => {
                self.notifier.error("Select images first");
                return Err(InputError::NoFiles.into());
            }
            Err(InputError::NoImages) => {
                self.notifier.error("Select image files");
                return Err(InputError::NoImages.into());
            }
            Err(e) => return self.surface(Err(e), "Cannot read selection"),
        };
        self.notifier
            .success(&format!("{} images selected", files.len()));

        let renderer = self.renderer();
        println!("{}", renderer.selection(&SelectionView::new(&files)));

        let output_dir = output.or_else(|| self.config.detect.output_dir.clone());
        let mut orchestrator =
            BatchOrchestrator::new(Arc::clone(&self.api), Arc::clone(&self.notifier))
                .with_options(BatchOptions { output_dir });

        let progress = BatchProgress::new(&self.progress, files.len());
        let outcome = orchestrator
            .run(files, &mut self.dashboard, |event| match event {
                BatchEvent::Processing { file, .. } => progress.processing(&sanitize(&file.name)),
                BatchEvent::Succeeded { index, result } => {
                    progress.println(renderer.batch_item(&BatchItemView::new(index, result)));
                    progress.advance();
                }
                BatchEvent::Failed { failure, .. } => {
                    progress.println(format!(
                        "{} {} {}",
                        StatusIcons::ERROR.red(),
                        sanitize(&failure.file_name),
                        format!("({})", sanitize(&failure.message)).bright_black()
                    ));
                    progress.advance();
                }
                BatchEvent::Started { .. } | BatchEvent::Finished { .. } => {}
            })
            .await;
        let elapsed = progress.finish();
        let report = outcome?;
        print_kv("Elapsed", &format_duration(elapsed));

        if let Some(last) = report.last() {
            print_subheader("Comparison");
            println!("{}", renderer.compare(&CompareView::from(last)));
        }
        self.print_dashboard(&renderer);

        let persisted = orchestrator.settle().await;
        if persisted.failed > 0 {
            warn!(
                "{} of {} history save(s) failed",
                persisted.failed,
                persisted.saved + persisted.failed
            );
        }
        Ok(report)
    }

    fn print_dashboard(&self, renderer: &Renderer) {
        print_subheader(&format!("{} Statistics", StatusIcons::LEAF));
        println!("{}", renderer.stats_panel(&StatsPanelView::new(self.dashboard.panel())));
        print_subheader(&format!("{} Recent detections", StatusIcons::CHART));
        println!("{}", renderer.chart(&self.dashboard.chart));
        if !self.dashboard.chart.is_empty() {
            println!("{}", renderer.chart_legend());
        }
    }

    /// Statistics of the latest result plus the history chart
    pub async fn show_dashboard(&mut self) -> Result<()> {
        self.seed_dashboard().await;
        if self.dashboard.panel().is_none() {
            // Outside a batch the newest stored record stands in as the latest result
            if let Some(latest) = self.latest_stored {
                self.dashboard.show(latest, None);
            }
        }
        let renderer = self.renderer();
        self.print_dashboard(&renderer);
        Ok(())
    }

    // ========================================================================
    // Settings
    // ========================================================================

    pub async fn save_confidence(&self, value: f32) -> Result<()> {
        let _spinner = PendingSpinner::start(&self.progress, "Saving settings...");
        settings::save_confidence(self.api.as_ref(), self.notifier.as_ref(), value).await
    }

    // ========================================================================
    // Models
    // ========================================================================

    pub async fn models(&self, command: ModelsCommand) -> Result<()> {
        let manager = ModelManager::new(Arc::clone(&self.api), Arc::clone(&self.notifier));
        match command {
            ModelsCommand::List => {
                let catalog = self.surface(manager.catalog().await, "Cannot load models")?;
                self.print_models(&ModelItemView::list(&catalog));
            }
            ModelsCommand::Use { name } => {
                let catalog = {
                    let _spinner =
                        PendingSpinner::start(&self.progress, &format!("Switching to {}...", name));
                    manager.select(&name).await?
                };
                self.print_models(&ModelItemView::list(&catalog));
            }
            ModelsCommand::Delete { name, yes } => {
                if !self.confirm(&format!("Delete model {}?", name), yes)? {
                    self.notifier.info("Cancelled");
                    return Ok(());
                }
                let catalog = {
                    let _spinner =
                        PendingSpinner::start(&self.progress, &format!("Deleting {}...", name));
                    manager.delete(&name).await?
                };
                self.print_models(&ModelItemView::list(&catalog));
            }
            ModelsCommand::Upload { file } => {
                let _spinner = PendingSpinner::start(&self.progress, "Uploading model...");
                manager.upload(&file).await?;
            }
        }
        Ok(())
    }

    fn print_models(&self, items: &[ModelItemView]) {
        print_subheader(&format!("{} Models", StatusIcons::MODEL));
        println!("{}", self.renderer().models(items));
    }

    // ========================================================================
    // History
    // ========================================================================

    pub async fn history(&self, command: HistoryCommand) -> Result<()> {
        let browser = HistoryBrowser::new(Arc::clone(&self.api), Arc::clone(&self.notifier));
        match command {
            HistoryCommand::List => {
                let records = self.surface(browser.load().await, "Cannot load history")?;
                self.print_history(&records.iter().map(HistoryItemView::from).collect::<Vec<_>>());
            }
            HistoryCommand::Delete { id, yes } => {
                if !self.confirm(&format!("Delete history record #{}?", id), yes)? {
                    self.notifier.info("Cancelled");
                    return Ok(());
                }
                let records = browser.delete(&HistoryId::new(id)).await?;
                self.print_history(&records.iter().map(HistoryItemView::from).collect::<Vec<_>>());
            }
            HistoryCommand::Export { dest, open } => {
                let dest = dest.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
                let size = {
                    let _spinner = PendingSpinner::start(&self.progress, "Downloading export...");
                    self.surface(browser.export(&dest).await, "Export failed")?
                };
                print_kv("File", &dest.display().to_string());
                print_kv("Size", &humansize::format_size(size, humansize::DECIMAL));
                if open {
                    self.surface(open_file(&dest), "Cannot open export")?;
                }
            }
        }
        Ok(())
    }

    fn print_history(&self, items: &[HistoryItemView]) {
        print_subheader(&format!("{} History", StatusIcons::HISTORY));
        println!("{}", self.renderer().history(items));
    }

    // ========================================================================
    // Theme & config
    // ========================================================================

    /// Show or change the theme; changes are written to the config file
    pub fn theme(&mut self, action: ThemeAction) -> Result<()> {
        let current = self.config.general.theme;
        let next = match action {
            ThemeAction::Show => {
                print_kv("Theme", &format!("{} {}", current.icon(), current));
                return Ok(());
            }
            ThemeAction::Light => Theme::Light,
            ThemeAction::Dark => Theme::Dark,
            ThemeAction::Toggle => current.toggled(),
        };

        self.config.general.theme = next;
        self.surface(self.config.save_to(&self.config_path), "Cannot save theme")?;
        info!("Theme set to {}", next);
        self.notifier.success(&format!("Theme: {}", next));
        Ok(())
    }

    fn config_command(&self, init: bool) -> Result<()> {
        if init {
            let created = self.surface(Config::ensure_exists(&self.config_path), "Cannot create config")?;
            if created {
                self.notifier
                    .success(&format!("Config created at {}", self.config_path.display()));
            } else {
                self.notifier
                    .info(&format!("Config already exists at {}", self.config_path.display()));
            }
            return Ok(());
        }

        print_subheader("Configuration");
        print_kv("File", &self.config_path.display().to_string());
        print_kv("Server", &self.config.server.base_url);
        print_kv("Theme", &self.config.general.theme.to_string());
        print_kv("Log level", &self.config.general.log_level);
        print_kv(
            "Output folder",
            &self
                .config
                .detect
                .output_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".to_string()),
        );
        Ok(())
    }

    /// `yes` skips the prompt; without a terminal the action is refused
    fn confirm(&self, prompt: &str, yes: bool) -> Result<bool> {
        if yes {
            return Ok(true);
        }
        if !self.interactive {
            self.notifier.error("Confirmation required (use --yes)");
            return Ok(false);
        }
        let answer = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact();
        self.surface(answer, "Cannot read confirmation")
    }
}

fn open_file(path: &Path) -> Result<()> {
    opener::open(path).with_context(|| format!("Failed to open {}", path.display()))
}
