//! Frequency Statistics Module
//! Value-count tables and the monthly series behind the dashboard charts.

use polars::prelude::*;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// How a frequency table is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Pie,
    Bar,
}

/// One category column charted for a visit type.
#[derive(Debug, Clone, Copy)]
pub struct ChartSpec {
    pub column: &'static str,
    pub title: &'static str,
    pub kind: ChartKind,
}

const fn bar(column: &'static str, title: &'static str) -> ChartSpec {
    ChartSpec {
        column,
        title,
        kind: ChartKind::Bar,
    }
}

/// Category columns charted for admissions.
pub const ADMISSAO_CHARTS: [ChartSpec; 16] = [
    ChartSpec {
        column: "sexo",
        title: "Sexo",
        kind: ChartKind::Pie,
    },
    bar("cid_principal", "CID"),
    bar("origem_encaminhamento", "Origem"),
    bar("paciente_absorvido", "Absorvido"),
    bar("membro_avaliado", "Membro avaliado"),
    bar("tempo_tratamento", "Tempo de tratamento"),
    bar("forca_muscular_inicial", "Força muscular inicial"),
    bar("forca_muscular_final", "Força muscular final"),
    bar("dash_inicial", "DASH inicial"),
    bar("dash_final", "DASH final"),
    bar("tinetti_inicial", "Tinetti inicial"),
    bar("tinetti_final", "Tinetti final"),
    bar("tug_teste_inicial", "TUG inicial"),
    bar("teste_tug_final", "TUG final"),
    bar("forca_mi", "Força MI"),
    bar("forca_mi_final", "Força MI final"),
];

/// Category columns charted for discharges.
pub const ALTA_CHARTS: [ChartSpec; 1] = [bar("motivo_alta", "Motivo da alta")];

/// Columns charted for a visit type. Reassessments chart nothing beyond the
/// monthly series and the table.
pub fn chart_plan(tipo: &str) -> &'static [ChartSpec] {
    match tipo {
        "Admissão" => &ADMISSAO_CHARTS,
        "Alta" => &ALTA_CHARTS,
        _ => &[],
    }
}

/// One distinct value and its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyEntry {
    pub label: String,
    pub count: u32,
}

/// Frequency distribution of one category column within the filtered view.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    pub column: String,
    pub title: String,
    pub kind: ChartKind,
    pub entries: Vec<FrequencyEntry>,
}

impl FrequencyTable {
    /// Total count across all entries.
    pub fn total(&self) -> u32 {
        self.entries.iter().map(|e| e.count).sum()
    }
}

/// Row count for one month of the filtered year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCount {
    pub mes: i32,
    pub count: u32,
}

/// Computes frequency tables with multi-threading across chart columns.
pub struct FrequencyCounter;

impl FrequencyCounter {
    /// Tally the distinct non-null values of one column, most frequent
    /// first, ties broken alphabetically. A missing column yields an empty
    /// table.
    pub fn value_counts(df: &DataFrame, column: &str) -> Vec<FrequencyEntry> {
        let Some(series) = df
            .column(column)
            .ok()
            .map(|col| col.as_materialized_series().clone())
        else {
            return Vec::new();
        };

        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for val in series.iter() {
            if val.is_null() {
                continue;
            }
            let label = val.to_string().trim_matches('"').to_string();
            *counts.entry(label).or_insert(0) += 1;
        }

        let mut entries: Vec<FrequencyEntry> = counts
            .into_iter()
            .map(|(label, count)| FrequencyEntry { label, count })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
        entries
    }

    /// Compute the visit type's chart plan in parallel, dropping any table
    /// that came back empty.
    pub fn chart_tables(df: &DataFrame, tipo: &str) -> Vec<FrequencyTable> {
        chart_plan(tipo)
            .par_iter()
            .filter_map(|spec| {
                let entries = Self::value_counts(df, spec.column);
                if entries.is_empty() {
                    None
                } else {
                    Some(FrequencyTable {
                        column: spec.column.to_string(),
                        title: spec.title.to_string(),
                        kind: spec.kind,
                        entries,
                    })
                }
            })
            .collect()
    }

    /// Count rows per `mes_inicio`, chronological.
    pub fn monthly_counts(df: &DataFrame) -> Vec<MonthCount> {
        let Some(series) = df
            .column("mes_inicio")
            .ok()
            .map(|col| col.as_materialized_series().clone())
        else {
            return Vec::new();
        };

        let mut counts: BTreeMap<i32, u32> = BTreeMap::new();
        for val in series.iter() {
            let mes = match val {
                AnyValue::Int32(n) => n,
                AnyValue::Int64(n) => match i32::try_from(n) {
                    Ok(n) => n,
                    Err(_) => continue,
                },
                _ => continue,
            };
            *counts.entry(mes).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|(mes, count)| MonthCount { mes, count })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(label: &str, count: u32) -> FrequencyEntry {
        FrequencyEntry {
            label: label.to_string(),
            count,
        }
    }

    #[test]
    fn counts_are_ordered_and_sum_to_non_null_rows() {
        let df = DataFrame::new(vec![
            Series::new(
                "motivo_alta".into(),
                vec![
                    Some("Alta por abandono"),
                    Some("Alta óbito"),
                    Some("Alta por abandono"),
                    None,
                    Some("Alta a pedido"),
                ],
            )
            .into(),
        ])
        .unwrap();

        let entries = FrequencyCounter::value_counts(&df, "motivo_alta");
        assert_eq!(
            entries,
            vec![
                entry("Alta por abandono", 2),
                entry("Alta a pedido", 1),
                entry("Alta óbito", 1),
            ]
        );

        let total: u32 = entries.iter().map(|e| e.count).sum();
        assert_eq!(total as usize, 4);
    }

    #[test]
    fn numeric_values_keep_plain_labels() {
        let df = DataFrame::new(vec![
            Series::new("tempo_tratamento".into(), vec![6i64, 12, 6]).into(),
        ])
        .unwrap();

        let entries = FrequencyCounter::value_counts(&df, "tempo_tratamento");
        assert_eq!(entries, vec![entry("6", 2), entry("12", 1)]);
    }

    #[test]
    fn missing_column_yields_empty_table() {
        let df = DataFrame::new(vec![Series::new("sexo".into(), vec!["Feminino"]).into()])
            .unwrap();
        assert!(FrequencyCounter::value_counts(&df, "cid_principal").is_empty());
    }

    #[test]
    fn admission_plan_charts_sex_as_pie() {
        let plan = chart_plan("Admissão");
        assert_eq!(plan.len(), 16);
        assert_eq!(plan[0].column, "sexo");
        assert_eq!(plan[0].kind, ChartKind::Pie);
        assert!(plan[1..].iter().all(|spec| spec.kind == ChartKind::Bar));
    }

    #[test]
    fn reassessment_plan_is_empty() {
        assert!(chart_plan("Reavaliação").is_empty());
        assert!(FrequencyCounter::chart_tables(&DataFrame::default(), "Reavaliação").is_empty());
    }

    #[test]
    fn empty_tables_are_suppressed() {
        let df = DataFrame::new(vec![
            Series::new("sexo".into(), vec![Some("Feminino"), Some("Masculino")]).into(),
            Series::new("motivo_alta".into(), vec![None::<&str>, None]).into(),
        ])
        .unwrap();

        let tables = FrequencyCounter::chart_tables(&df, "Admissão");
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].column, "sexo");
        assert_eq!(tables[0].kind, ChartKind::Pie);
        assert_eq!(tables[0].total(), 2);

        assert!(FrequencyCounter::chart_tables(&df, "Alta").is_empty());
    }

    #[test]
    fn monthly_counts_are_chronological() {
        let df = DataFrame::new(vec![
            Series::new(
                "mes_inicio".into(),
                vec![Some(7i32), Some(3), Some(7), None, Some(1)],
            )
            .into(),
        ])
        .unwrap();

        let monthly = FrequencyCounter::monthly_counts(&df);
        assert_eq!(
            monthly,
            vec![
                MonthCount { mes: 1, count: 1 },
                MonthCount { mes: 3, count: 1 },
                MonthCount { mes: 7, count: 2 },
            ]
        );
    }
}
