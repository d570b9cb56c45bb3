//! Dashboard Panel
//! Central panel with the filtered table, frequency charts, and monthly trend.

use crate::charts::ChartPlotter;
use crate::data::codebook;
use crate::data::{date_from_days, FilterSelection, MonthFilter};
use crate::stats::{ChartKind, FrequencyTable, MonthCount};
use egui::{Color32, RichText};
use polars::prelude::{AnyValue, Column, DataFrame};

const CARD_WIDTH: f32 = 330.0;
const CARD_SPACING: f32 = 15.0;
const CHART_HEIGHT: f32 = 220.0;
const PIE_SIZE: f32 = 180.0;
const TABLE_ROW_HEIGHT: f32 = 22.0;
const TABLE_MAX_HEIGHT: f32 = 340.0;
const CELL_WIDTH: f32 = 110.0;

/// Central panel state for the current filtered view.
#[derive(Default)]
pub struct Dashboard {
    selection: Option<FilterSelection>,
    filtered: Option<DataFrame>,
    display: Option<DataFrame>,
    tables: Vec<FrequencyTable>,
    monthly: Vec<MonthCount>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.selection = None;
        self.filtered = None;
        self.display = None;
        self.tables.clear();
        self.monthly.clear();
    }

    /// Install a freshly filtered view. The display copy loses the patient
    /// identifier columns; the full frame is kept for the Excel export.
    pub fn set_view(
        &mut self,
        selection: FilterSelection,
        filtered: DataFrame,
        tables: Vec<FrequencyTable>,
        monthly: Vec<MonthCount>,
    ) {
        self.display = Some(filtered.drop_many(codebook::IDENTIFIER_COLUMNS));
        self.filtered = Some(filtered);
        self.selection = Some(selection);
        self.tables = tables;
        self.monthly = monthly;
    }

    /// Filtered rows backing the export, identifiers included.
    pub fn filtered_view(&self) -> Option<&DataFrame> {
        self.filtered.as_ref()
    }

    /// Draw the dashboard
    pub fn show(&mut self, ui: &mut egui::Ui) {
        let (selection, display) = match (&self.selection, &self.display) {
            (Some(selection), Some(display)) => (selection, display),
            _ => {
                ui.vertical_centered(|ui| {
                    ui.add_space(200.0);
                    ui.label(
                        RichText::new("Nenhum dado carregado")
                            .size(18.0)
                            .color(Color32::GRAY),
                    );
                    ui.add_space(5.0);
                    ui.label(
                        RichText::new("Carregue um arquivo CSV para começar")
                            .size(13.0)
                            .color(Color32::DARK_GRAY),
                    );
                });
                return;
            }
        };

        ui.add_space(5.0);
        ui.label(
            RichText::new(format!("{} – {}", selection.tipo, selection.setor))
                .size(22.0)
                .strong(),
        );
        let subtitle = match selection.mes {
            MonthFilter::All => format!("Ano completo de {}", selection.ano),
            MonthFilter::Month(mes) => format!(
                "{}/{}",
                codebook::mes_nome(mes).unwrap_or("?"),
                selection.ano
            ),
        };
        ui.label(RichText::new(subtitle).size(15.0).color(Color32::GRAY));
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(10.0);

        if display.height() == 0 {
            ui.label(
                RichText::new("Nenhum registro encontrado para os filtros selecionados.")
                    .size(14.0)
                    .color(Color32::from_rgb(255, 193, 7)),
            );
            return;
        }

        let show_trend = selection.mes == MonthFilter::All && !self.monthly.is_empty();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                Self::data_table(ui, display);
                ui.add_space(CARD_SPACING);

                if show_trend {
                    ui.label(
                        RichText::new("Evolução mensal de registros")
                            .size(16.0)
                            .strong(),
                    );
                    ui.add_space(4.0);
                    ChartPlotter::draw_monthly_line(ui, &self.monthly, CHART_HEIGHT);
                    ui.add_space(CARD_SPACING);
                }

                let ncols = ((ui.available_width() / (CARD_WIDTH + CARD_SPACING)).floor()
                    as usize)
                    .max(1);
                for row in self.tables.chunks(ncols) {
                    ui.horizontal(|ui| {
                        for table in row {
                            Self::chart_card(ui, table);
                            ui.add_space(CARD_SPACING);
                        }
                    });
                    ui.add_space(CARD_SPACING);
                }
            });
    }

    fn chart_card(ui: &mut egui::Ui, table: &FrequencyTable) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(8.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(CARD_WIDTH);
                ui.label(RichText::new(&table.title).size(14.0).strong());
                ui.add_space(6.0);
                match table.kind {
                    ChartKind::Pie => ChartPlotter::draw_pie_chart(ui, table, PIE_SIZE),
                    ChartKind::Bar => ChartPlotter::draw_bar_chart(ui, table, CHART_HEIGHT),
                }
            });
    }

    fn data_table(ui: &mut egui::Ui, display: &DataFrame) {
        let names: Vec<String> = display
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        egui::ScrollArea::horizontal()
            .id_salt("tabela_h")
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    for name in &names {
                        ui.add_sized(
                            [CELL_WIDTH, TABLE_ROW_HEIGHT],
                            egui::Label::new(RichText::new(name).size(12.0).strong()).truncate(),
                        );
                    }
                });
                ui.separator();

                egui::ScrollArea::vertical()
                    .id_salt("tabela_v")
                    .max_height(TABLE_MAX_HEIGHT)
                    .show_rows(ui, TABLE_ROW_HEIGHT, display.height(), |ui, row_range| {
                        for row_idx in row_range {
                            ui.horizontal(|ui| {
                                for column in display.get_columns() {
                                    ui.add_sized(
                                        [CELL_WIDTH, TABLE_ROW_HEIGHT],
                                        egui::Label::new(
                                            RichText::new(Self::cell_text(column, row_idx))
                                                .size(11.0),
                                        )
                                        .truncate(),
                                    );
                                }
                            });
                        }
                    });
            });
    }

    fn cell_text(column: &Column, row: usize) -> String {
        match column.get(row) {
            Ok(AnyValue::Null) | Err(_) => String::new(),
            Ok(AnyValue::Date(days)) => date_from_days(days)
                .map(|date| date.to_string())
                .unwrap_or_default(),
            Ok(value) => value.to_string().trim_matches('"').to_string(),
        }
    }
}
