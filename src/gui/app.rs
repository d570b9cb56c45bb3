//! Fisiodash Main Application
//! Main window with filter sidebar and dashboard panel.

use crate::config::AppConfig;
use crate::data::{DataLoader, FilterSelector, MonthFilter, Normalizer};
use crate::gui::{Dashboard, Sidebar, SidebarAction};
use crate::stats::FrequencyCounter;
use crate::xlsx::XlsxGenerator;
use anyhow::Context;
use egui::SidePanel;
use log::{error, info};
use polars::prelude::DataFrame;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

/// CSV loading result from background thread
enum LoadResult {
    Progress(String),
    Complete { df: DataFrame },
    Error(String),
}

/// Main application window.
pub struct FisioDashApp {
    loader: DataLoader,
    sidebar: Sidebar,
    dashboard: Dashboard,
    config: AppConfig,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
}

impl FisioDashApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = AppConfig::load();
        let mut app = Self {
            loader: DataLoader::new(),
            sidebar: Sidebar::new(),
            dashboard: Dashboard::new(),
            config,
            load_rx: None,
        };

        // A path on the command line wins over the configured default
        let initial_csv = std::env::args()
            .nth(1)
            .map(PathBuf::from)
            .or_else(|| app.config.csv_path.clone());
        if let Some(path) = initial_csv {
            app.start_load(path);
        }

        app
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if self.sidebar.is_loading {
            return; // Already loading
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Arquivos CSV", &["csv"])
            .pick_file()
        {
            self.start_load(path);
        }
    }

    /// Read and normalize the CSV in a background thread
    fn start_load(&mut self, path: PathBuf) {
        info!("Loading CSV from {}", path.display());

        // Clear the previous view
        self.dashboard.clear();
        self.sidebar.export_enabled = false;
        self.sidebar.csv_path = Some(path.clone());
        self.sidebar.status = "Carregando CSV...".to_string();
        self.sidebar.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            Self::load_worker(path, tx);
        });
    }

    /// Load pipeline (called from background thread)
    fn load_worker(path: PathBuf, tx: Sender<LoadResult>) {
        let _ = tx.send(LoadResult::Progress("Lendo arquivo CSV...".to_string()));

        let raw = match DataLoader::read_csv(&path.to_string_lossy()) {
            Ok(df) => df,
            Err(e) => {
                let _ = tx.send(LoadResult::Error(e.to_string()));
                return;
            }
        };

        let _ = tx.send(LoadResult::Progress("Normalizando dados...".to_string()));

        match Normalizer::normalize(raw) {
            Ok(df) => {
                let _ = tx.send(LoadResult::Complete { df });
            }
            Err(e) => {
                let _ = tx.send(LoadResult::Error(e.to_string()));
            }
        }
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(status) => {
                        self.sidebar.status = status;
                    }
                    LoadResult::Complete { df } => {
                        self.loader.set_dataframe(df);
                        let rows = self.loader.get_row_count();
                        info!("CSV ready: {} rows", rows);
                        self.sidebar.status = format!("{} registros carregados", rows);
                        self.sidebar.is_loading = false;
                        self.reset_selection();
                        self.recompute();
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(error) => {
                        error!("CSV load failed: {}", error);
                        self.sidebar.status = format!("Erro: {}", error);
                        self.sidebar.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            // Put receiver back if still needed
            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Fresh data gets fresh selections
    fn reset_selection(&mut self) {
        self.sidebar.tipo = None;
        self.sidebar.setor = None;
        self.sidebar.ano = None;
        self.sidebar.mes = MonthFilter::All;
    }

    /// Re-derive filter options and the filtered view for the current selection
    fn recompute(&mut self) {
        let df = match self.loader.get_dataframe() {
            Some(df) => df,
            None => {
                self.dashboard.clear();
                return;
            }
        };

        self.sidebar.set_options(FilterSelector::options(df));
        let meses = self
            .sidebar
            .ano
            .map(|ano| FilterSelector::months_for_year(df, ano))
            .unwrap_or_default();
        self.sidebar.set_months(meses);

        let selection = match self.sidebar.selection() {
            Some(selection) => selection,
            None => {
                self.sidebar.export_enabled = false;
                self.dashboard.clear();
                return;
            }
        };

        match FilterSelector::apply(df, &selection) {
            Ok(filtered) => {
                let tables = if filtered.height() > 0 {
                    FrequencyCounter::chart_tables(&filtered, &selection.tipo)
                } else {
                    Vec::new()
                };
                let monthly = if filtered.height() > 0 && selection.mes == MonthFilter::All {
                    FrequencyCounter::monthly_counts(&filtered)
                } else {
                    Vec::new()
                };
                // An empty view still exports, as a header-only sheet
                self.sidebar.export_enabled = true;
                self.dashboard.set_view(selection, filtered, tables, monthly);
            }
            Err(e) => {
                error!("Filtering failed: {}", e);
                self.sidebar.status = format!("Erro: {}", e);
                self.sidebar.export_enabled = false;
                self.dashboard.clear();
            }
        }
    }

    /// Handle Excel export - build the workbook and ask where to save it
    fn handle_export(&mut self) {
        let filtered = match self.dashboard.filtered_view() {
            Some(df) => df,
            None => {
                self.sidebar.status = "Nada para exportar".to_string();
                return;
            }
        };

        match Self::export_xlsx(filtered, &self.config.export_file_name) {
            Ok(Some(path)) => {
                info!("Excel written to {}", path.display());
                self.sidebar.status = format!("Excel exportado: {}", path.display());
                let _ = open::that(&path);
            }
            Ok(None) => {} // User cancelled
            Err(e) => {
                error!("Export failed: {:#}", e);
                self.sidebar.status = format!("Erro na exportação: {:#}", e);
            }
        }
    }

    fn export_xlsx(filtered: &DataFrame, file_name: &str) -> anyhow::Result<Option<PathBuf>> {
        let bytes = XlsxGenerator::workbook_from_dataframe(filtered, "dados_filtrados")
            .context("Failed to build the workbook")?;

        let Some(path) = rfd::FileDialog::new()
            .add_filter("Planilha Excel", &["xlsx"])
            .set_file_name(file_name)
            .save_file()
        else {
            return Ok(None);
        };

        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(Some(path))
    }
}

impl eframe::App for FisioDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.sidebar.is_loading {
            ctx.request_repaint();
        }

        // Left panel - filters and export
        SidePanel::left("sidebar")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.sidebar.show(ui);

                    match action {
                        SidebarAction::BrowseCsv => self.handle_browse_csv(),
                        SidebarAction::SelectionChanged => self.recompute(),
                        SidebarAction::ExportXlsx => self.handle_export(),
                        SidebarAction::None => {}
                    }
                });
            });

        // Central panel - table and charts
        egui::CentralPanel::default().show(ctx, |ui| {
            self.dashboard.show(ui);
        });
    }
}
