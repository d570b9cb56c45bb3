//! Sidebar Widget
//! Left panel with file selection, the four filters, and the Excel export.

use crate::data::codebook;
use crate::data::{FilterOptions, FilterSelection, MonthFilter};
use egui::{Color32, ComboBox, RichText};
use std::path::PathBuf;

/// Left filter panel state.
pub struct Sidebar {
    pub csv_path: Option<PathBuf>,
    pub tipos: Vec<String>,
    pub setores: Vec<String>,
    pub anos: Vec<i32>,
    pub meses: Vec<i32>,
    pub tipo: Option<String>,
    pub setor: Option<String>,
    pub ano: Option<i32>,
    pub mes: MonthFilter,
    pub status: String,
    pub is_loading: bool,
    pub export_enabled: bool,
}

impl Default for Sidebar {
    fn default() -> Self {
        Self {
            csv_path: None,
            tipos: Vec::new(),
            setores: Vec::new(),
            anos: Vec::new(),
            meses: Vec::new(),
            tipo: None,
            setor: None,
            ano: None,
            mes: MonthFilter::All,
            status: "Aguardando arquivo CSV".to_string(),
            is_loading: false,
            export_enabled: false,
        }
    }
}

impl Sidebar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the option lists, keeping current selections when still valid
    /// and falling back to the first option otherwise.
    pub fn set_options(&mut self, options: FilterOptions) {
        self.tipos = options.tipos;
        self.setores = options.setores;
        self.anos = options.anos;

        if self.tipo.as_ref().map_or(true, |t| !self.tipos.contains(t)) {
            self.tipo = self.tipos.first().cloned();
        }
        if self
            .setor
            .as_ref()
            .map_or(true, |s| !self.setores.contains(s))
        {
            self.setor = self.setores.first().cloned();
        }
        if self.ano.map_or(true, |a| !self.anos.contains(&a)) {
            self.ano = self.anos.first().copied();
        }
    }

    /// Replace the month options for the selected year; a concrete month no
    /// longer present falls back to the whole year.
    pub fn set_months(&mut self, meses: Vec<i32>) {
        self.meses = meses;
        if let MonthFilter::Month(mes) = self.mes {
            if !self.meses.contains(&mes) {
                self.mes = MonthFilter::All;
            }
        }
    }

    /// Current complete selection, if every filter has a value.
    pub fn selection(&self) -> Option<FilterSelection> {
        Some(FilterSelection {
            tipo: self.tipo.clone()?,
            setor: self.setor.clone()?,
            ano: self.ano?,
            mes: self.mes,
        })
    }

    /// Draw the sidebar
    pub fn show(&mut self, ui: &mut egui::Ui) -> SidebarAction {
        let mut action = SidebarAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Indicadores de Fisioterapia")
                    .size(18.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Ambulatório de Fisioterapia")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== CSV File Section =====
        ui.label(RichText::new("📁 Arquivo de dados").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "Nenhum arquivo selecionado".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.csv_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Abrir").clicked() {
                            action = SidebarAction::BrowseCsv;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filters Section =====
        ui.label(RichText::new("Filtros").size(14.0).strong());
        ui.add_space(8.0);

        let combo_width = 200.0;

        ui.label("Selecione o tipo");
        ComboBox::from_id_salt("filtro_tipo")
            .width(combo_width)
            .selected_text(self.tipo.clone().unwrap_or_default())
            .show_ui(ui, |ui| {
                for tipo in &self.tipos {
                    if ui
                        .selectable_label(self.tipo.as_deref() == Some(tipo), tipo)
                        .clicked()
                    {
                        self.tipo = Some(tipo.clone());
                        action = SidebarAction::SelectionChanged;
                    }
                }
            });

        ui.add_space(5.0);

        ui.label("Selecione o setor");
        ComboBox::from_id_salt("filtro_setor")
            .width(combo_width)
            .selected_text(self.setor.clone().unwrap_or_default())
            .show_ui(ui, |ui| {
                for setor in &self.setores {
                    if ui
                        .selectable_label(self.setor.as_deref() == Some(setor), setor)
                        .clicked()
                    {
                        self.setor = Some(setor.clone());
                        action = SidebarAction::SelectionChanged;
                    }
                }
            });

        ui.add_space(5.0);

        ui.label("Ano de início");
        ComboBox::from_id_salt("filtro_ano")
            .width(combo_width)
            .selected_text(self.ano.map(|a| a.to_string()).unwrap_or_default())
            .show_ui(ui, |ui| {
                for &ano in &self.anos {
                    if ui
                        .selectable_label(self.ano == Some(ano), ano.to_string())
                        .clicked()
                    {
                        self.ano = Some(ano);
                        // Month options belong to the previous year
                        self.mes = MonthFilter::All;
                        action = SidebarAction::SelectionChanged;
                    }
                }
            });

        ui.add_space(5.0);

        ui.label("Mês de início");
        let mes_text = match self.mes {
            MonthFilter::All => "Todos os meses".to_string(),
            MonthFilter::Month(mes) => codebook::mes_nome(mes).unwrap_or("?").to_string(),
        };
        ComboBox::from_id_salt("filtro_mes")
            .width(combo_width)
            .selected_text(mes_text)
            .show_ui(ui, |ui| {
                if ui
                    .selectable_label(self.mes == MonthFilter::All, "Todos os meses")
                    .clicked()
                {
                    self.mes = MonthFilter::All;
                    action = SidebarAction::SelectionChanged;
                }
                for &mes in &self.meses {
                    let nome = codebook::mes_nome(mes).unwrap_or("?");
                    if ui
                        .selectable_label(self.mes == MonthFilter::Month(mes), nome)
                        .clicked()
                    {
                        self.mes = MonthFilter::Month(mes);
                        action = SidebarAction::SelectionChanged;
                    }
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Section =====
        ui.label(RichText::new("Exportar dados").size(14.0).strong());
        ui.add_space(5.0);

        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("📄 Baixar Excel").size(14.0))
                    .min_size(egui::vec2(160.0, 30.0));
                if ui.add(button).clicked() {
                    action = SidebarAction::ExportXlsx;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        if self.is_loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new(&self.status).size(11.0));
            });
        } else {
            let status_color = if self.status.starts_with("Erro") {
                Color32::from_rgb(220, 53, 69)
            } else if self.status.contains("carregado") || self.status.contains("exportado") {
                Color32::from_rgb(40, 167, 69)
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(&self.status).size(11.0).color(status_color));
        }

        action
    }
}

/// Actions triggered by the sidebar
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarAction {
    None,
    BrowseCsv,
    SelectionChanged,
    ExportXlsx,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn options() -> FilterOptions {
        FilterOptions {
            tipos: vec!["Admissão".to_string(), "Alta".to_string()],
            setores: vec!["Neuropediatria".to_string(), "Urogenecologia".to_string()],
            anos: vec![2023, 2024],
        }
    }

    #[test]
    fn fresh_sidebar_selects_first_options() {
        let mut sidebar = Sidebar::new();
        sidebar.set_options(options());
        assert_eq!(sidebar.tipo.as_deref(), Some("Admissão"));
        assert_eq!(sidebar.setor.as_deref(), Some("Neuropediatria"));
        assert_eq!(sidebar.ano, Some(2023));
        assert_eq!(sidebar.mes, MonthFilter::All);
    }

    #[test]
    fn valid_selection_survives_new_options() {
        let mut sidebar = Sidebar::new();
        sidebar.tipo = Some("Alta".to_string());
        sidebar.setor = Some("Urogenecologia".to_string());
        sidebar.ano = Some(2024);
        sidebar.set_options(options());
        assert_eq!(sidebar.tipo.as_deref(), Some("Alta"));
        assert_eq!(sidebar.setor.as_deref(), Some("Urogenecologia"));
        assert_eq!(sidebar.ano, Some(2024));
    }

    #[test]
    fn stale_selection_falls_back_to_first() {
        let mut sidebar = Sidebar::new();
        sidebar.tipo = Some("Reavaliação".to_string());
        sidebar.ano = Some(2019);
        sidebar.set_options(options());
        assert_eq!(sidebar.tipo.as_deref(), Some("Admissão"));
        assert_eq!(sidebar.ano, Some(2023));
    }

    #[test]
    fn stale_month_falls_back_to_all() {
        let mut sidebar = Sidebar::new();
        sidebar.mes = MonthFilter::Month(7);
        sidebar.set_months(vec![1, 3]);
        assert_eq!(sidebar.mes, MonthFilter::All);

        sidebar.mes = MonthFilter::Month(3);
        sidebar.set_months(vec![1, 3]);
        assert_eq!(sidebar.mes, MonthFilter::Month(3));
    }

    #[test]
    fn selection_requires_every_filter() {
        let mut sidebar = Sidebar::new();
        assert!(sidebar.selection().is_none());

        sidebar.set_options(options());
        sidebar.set_months(vec![3]);
        sidebar.mes = MonthFilter::Month(3);

        let selection = sidebar.selection().unwrap();
        assert_eq!(selection.tipo, "Admissão");
        assert_eq!(selection.setor, "Neuropediatria");
        assert_eq!(selection.ano, 2023);
        assert_eq!(selection.mes, MonthFilter::Month(3));
    }
}
