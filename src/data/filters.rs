//! Filter Selector Module
//! Derives the selectable filter values and applies conjunctive predicates.

use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Failed to apply filters: {0}")]
    ApplyError(#[from] PolarsError),
}

/// Month filter: a concrete month or the whole year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthFilter {
    All,
    Month(i32),
}

/// Active filter combination chosen in the sidebar.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSelection {
    pub tipo: String,
    pub setor: String,
    pub ano: i32,
    pub mes: MonthFilter,
}

/// Selectable values derived from the normalized table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub tipos: Vec<String>,
    pub setores: Vec<String>,
    pub anos: Vec<i32>,
}

/// Computes filter options and filtered views over the normalized table.
pub struct FilterSelector;

impl FilterSelector {
    /// Distinct visit types and departments (alphabetical) and years
    /// (ascending) present in the table.
    pub fn options(df: &DataFrame) -> FilterOptions {
        FilterOptions {
            tipos: Self::unique_strings(df, "tipo"),
            setores: Self::unique_strings(df, "setor"),
            anos: Self::unique_ints(df, "ano_inicio"),
        }
    }

    /// Months present within one year, ascending.
    pub fn months_for_year(df: &DataFrame, ano: i32) -> Vec<i32> {
        df.clone()
            .lazy()
            .filter(col("ano_inicio").eq(lit(ano)))
            .select([col("mes_inicio")])
            .collect()
            .map(|monthly| Self::unique_ints(&monthly, "mes_inicio"))
            .unwrap_or_default()
    }

    /// Rows matching the selection. Type, department, and year must all
    /// match; the month predicate is added only for a concrete month.
    /// A zero-row result is not an error.
    pub fn apply(df: &DataFrame, selection: &FilterSelection) -> Result<DataFrame, FilterError> {
        let mut predicate = col("tipo")
            .eq(lit(selection.tipo.clone()))
            .and(col("setor").eq(lit(selection.setor.clone())))
            .and(col("ano_inicio").eq(lit(selection.ano)));

        if let MonthFilter::Month(mes) = selection.mes {
            predicate = predicate.and(col("mes_inicio").eq(lit(mes)));
        }

        Ok(df.clone().lazy().filter(predicate).collect()?)
    }

    fn unique_strings(df: &DataFrame, column: &str) -> Vec<String> {
        let mut values: Vec<String> = df
            .column(column)
            .ok()
            .and_then(|col| col.unique().ok())
            .map(|unique| {
                unique
                    .as_materialized_series()
                    .iter()
                    .filter_map(|v| {
                        if v.is_null() {
                            None
                        } else {
                            Some(v.to_string().trim_matches('"').to_string())
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();
        values.sort();
        values
    }

    fn unique_ints(df: &DataFrame, column: &str) -> Vec<i32> {
        let mut values: Vec<i32> = df
            .column(column)
            .ok()
            .and_then(|col| col.unique().ok())
            .map(|unique| {
                unique
                    .as_materialized_series()
                    .iter()
                    .filter_map(|v| match v {
                        AnyValue::Int32(n) => Some(n),
                        AnyValue::Int64(n) => i32::try_from(n).ok(),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        values.sort_unstable();
        values
    }
}
