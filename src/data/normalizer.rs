//! Data Normalizer Module
//! Recodes REDCap export columns into display labels and derives date parts.

use crate::data::codebook;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use log::debug;
use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizerError {
    #[error("Failed to normalize column: {0}")]
    ColumnError(#[from] PolarsError),
}

/// Applies the codebook to a freshly loaded indicator table.
///
/// Every step is best-effort per column: an absent column is skipped and a
/// cell whose code has no codebook entry becomes null.
pub struct Normalizer;

impl Normalizer {
    /// Recode all coded columns, rename the REDCap bookkeeping columns to
    /// their domain names, and derive year/month from the start date.
    pub fn normalize(df: DataFrame) -> Result<DataFrame, NormalizerError> {
        let df = Self::recode_str(df, "redcap_repeat_instrument", codebook::TIPO_LABELS)?;
        let df = Self::recode_str(df, "redcap_data_access_group", codebook::SETOR_LABELS)?;
        let df = Self::recode_code(df, "sexo", codebook::SEXO_LABELS)?;
        let df = Self::recode_code(df, "paciente_absorvido", codebook::ABSORVIDO_LABELS)?;
        let df = Self::recode_code(df, "membro_avaliado", codebook::MEMBRO_LABELS)?;
        let df = Self::recode_code(df, "motivo_alta", codebook::MOTIVO_ALTA_LABELS)?;
        let df = Self::rename_if_present(df, "redcap_repeat_instrument", "tipo")?;
        let df = Self::rename_if_present(df, "redcap_data_access_group", "setor")?;
        Self::derive_start_date(df)
    }

    /// Replace a string-keyed column with its labels.
    fn recode_str(
        mut df: DataFrame,
        column: &str,
        table: &'static [(&'static str, &'static str)],
    ) -> Result<DataFrame, NormalizerError> {
        let series = match df.column(column) {
            Ok(col) => col.as_materialized_series().clone(),
            Err(_) => return Ok(df),
        };

        let mut unmapped = 0usize;
        let labels: Vec<Option<String>> = series
            .iter()
            .map(|val| {
                if val.is_null() {
                    return None;
                }
                let code = val.to_string();
                match codebook::label_for_str(table, code.trim_matches('"')) {
                    Some(label) => Some(label.to_string()),
                    None => {
                        unmapped += 1;
                        None
                    }
                }
            })
            .collect();

        if unmapped > 0 {
            debug!("{}: {} value(s) without codebook entry set to null", column, unmapped);
        }

        df.with_column(Series::new(column.into(), labels))?;
        Ok(df)
    }

    /// Replace an integer-keyed column with its labels.
    fn recode_code(
        mut df: DataFrame,
        column: &str,
        table: &'static [(i64, &'static str)],
    ) -> Result<DataFrame, NormalizerError> {
        let series = match df.column(column) {
            Ok(col) => col.as_materialized_series().clone(),
            Err(_) => return Ok(df),
        };

        let mut unmapped = 0usize;
        let labels: Vec<Option<String>> = series
            .iter()
            .map(|val| {
                if val.is_null() {
                    return None;
                }
                let label = Self::code_from_any(&val)
                    .and_then(|code| codebook::label_for_code(table, code));
                match label {
                    Some(label) => Some(label.to_string()),
                    None => {
                        unmapped += 1;
                        None
                    }
                }
            })
            .collect();

        if unmapped > 0 {
            debug!("{}: {} value(s) without codebook entry set to null", column, unmapped);
        }

        df.with_column(Series::new(column.into(), labels))?;
        Ok(df)
    }

    /// Extract an integer code. CSV exports sometimes carry codes as floats
    /// or quoted strings; both are accepted when they hold a whole number.
    fn code_from_any(val: &AnyValue) -> Option<i64> {
        match val {
            AnyValue::Int8(v) => Some(i64::from(*v)),
            AnyValue::Int16(v) => Some(i64::from(*v)),
            AnyValue::Int32(v) => Some(i64::from(*v)),
            AnyValue::Int64(v) => Some(*v),
            AnyValue::UInt8(v) => Some(i64::from(*v)),
            AnyValue::UInt16(v) => Some(i64::from(*v)),
            AnyValue::UInt32(v) => Some(i64::from(*v)),
            AnyValue::UInt64(v) => i64::try_from(*v).ok(),
            AnyValue::Float32(v) => Self::float_code(f64::from(*v)),
            AnyValue::Float64(v) => Self::float_code(*v),
            AnyValue::String(s) => s.trim().parse().ok(),
            AnyValue::StringOwned(s) => s.as_str().trim().parse().ok(),
            _ => None,
        }
    }

    fn float_code(v: f64) -> Option<i64> {
        if v.is_finite() && v.fract() == 0.0 {
            Some(v as i64)
        } else {
            None
        }
    }

    fn rename_if_present(
        mut df: DataFrame,
        from: &str,
        to: &str,
    ) -> Result<DataFrame, NormalizerError> {
        if df.column(from).is_ok() {
            df.rename(from, to.into())?;
        }
        Ok(df)
    }

    /// Parse `inicio_tratamento` into a Date column and derive `ano_inicio`
    /// and `mes_inicio`, all null where the date is missing or unparseable.
    fn derive_start_date(mut df: DataFrame) -> Result<DataFrame, NormalizerError> {
        let series = match df.column("inicio_tratamento") {
            Ok(col) => col.as_materialized_series().clone(),
            Err(_) => return Ok(df),
        };

        let dates: Vec<Option<NaiveDate>> = series.iter().map(|val| Self::parse_date(&val)).collect();
        let anos: Vec<Option<i32>> = dates.iter().map(|d| d.map(|d| d.year())).collect();
        let meses: Vec<Option<i32>> = dates.iter().map(|d| d.map(|d| d.month() as i32)).collect();

        df.with_column(Series::new("inicio_tratamento".into(), dates))?;
        df.with_column(Series::new("ano_inicio".into(), anos))?;
        df.with_column(Series::new("mes_inicio".into(), meses))?;
        Ok(df)
    }

    fn parse_date(val: &AnyValue) -> Option<NaiveDate> {
        if val.is_null() {
            return None;
        }
        if let AnyValue::Date(days) = val {
            return date_from_days(*days);
        }

        let text = val.to_string();
        let text = text.trim_matches('"').trim();
        if text.is_empty() {
            return None;
        }

        for format in ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"] {
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                return Some(date);
            }
        }
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
            .map(|dt| dt.date())
            .ok()
    }
}

/// Calendar date for a polars `Date` value (days since the Unix epoch).
pub fn date_from_days(days: i32) -> Option<NaiveDate> {
    DateTime::from_timestamp(i64::from(days) * 86_400, 0).map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn str_value(df: &DataFrame, column: &str, row: usize) -> Option<String> {
        df.column(column)
            .unwrap()
            .str()
            .unwrap()
            .get(row)
            .map(|s| s.to_string())
    }

    #[test]
    fn admission_row_is_recoded() {
        let df = DataFrame::new(vec![
            Series::new("redcap_repeat_instrument".into(), vec!["admisso"]).into(),
            Series::new("redcap_data_access_group".into(), vec!["neurologia_adulto"]).into(),
            Series::new("sexo".into(), vec![1i64]).into(),
            Series::new("inicio_tratamento".into(), vec!["2023-03-15"]).into(),
        ])
        .unwrap();

        let df = Normalizer::normalize(df).unwrap();

        assert_eq!(str_value(&df, "tipo", 0), Some("Admissão".to_string()));
        assert_eq!(str_value(&df, "setor", 0), Some("Neurologia adulto".to_string()));
        assert_eq!(str_value(&df, "sexo", 0), Some("Feminino".to_string()));
        assert_eq!(df.column("ano_inicio").unwrap().i32().unwrap().get(0), Some(2023));
        assert_eq!(df.column("mes_inicio").unwrap().i32().unwrap().get(0), Some(3));
    }

    #[test]
    fn unmapped_codes_become_null() {
        let df = DataFrame::new(vec![
            Series::new("motivo_alta".into(), vec![6i64, 99]).into(),
            Series::new("redcap_repeat_instrument".into(), vec!["alta", "desconhecido"]).into(),
        ])
        .unwrap();

        let df = Normalizer::normalize(df).unwrap();

        assert_eq!(str_value(&df, "motivo_alta", 0), Some("Alta óbito".to_string()));
        assert_eq!(str_value(&df, "motivo_alta", 1), None);
        assert_eq!(str_value(&df, "tipo", 0), Some("Alta".to_string()));
        assert_eq!(str_value(&df, "tipo", 1), None);
    }

    #[test]
    fn float_and_string_codes_are_accepted() {
        let df = DataFrame::new(vec![Series::new("sexo".into(), vec![1.0f64, 2.0, 2.5]).into()])
            .unwrap();
        let df = Normalizer::normalize(df).unwrap();
        assert_eq!(str_value(&df, "sexo", 0), Some("Feminino".to_string()));
        assert_eq!(str_value(&df, "sexo", 1), Some("Masculino".to_string()));
        assert_eq!(str_value(&df, "sexo", 2), None);

        let df = DataFrame::new(vec![
            Series::new("paciente_absorvido".into(), vec!["1", "0", "x"]).into(),
        ])
        .unwrap();
        let df = Normalizer::normalize(df).unwrap();
        assert_eq!(str_value(&df, "paciente_absorvido", 0), Some("Sim".to_string()));
        assert_eq!(str_value(&df, "paciente_absorvido", 1), Some("Não".to_string()));
        assert_eq!(str_value(&df, "paciente_absorvido", 2), None);
    }

    #[test]
    fn unparseable_dates_become_null() {
        let df = DataFrame::new(vec![
            Series::new(
                "inicio_tratamento".into(),
                vec!["15/03/2023", "não informado", ""],
            )
            .into(),
        ])
        .unwrap();

        let df = Normalizer::normalize(df).unwrap();

        assert_eq!(df.column("inicio_tratamento").unwrap().dtype(), &DataType::Date);
        let anos = df.column("ano_inicio").unwrap().i32().unwrap().clone();
        assert_eq!(anos.get(0), Some(2023));
        assert_eq!(anos.get(1), None);
        assert_eq!(anos.get(2), None);
        let meses = df.column("mes_inicio").unwrap().i32().unwrap().clone();
        assert_eq!(meses.get(0), Some(3));
        assert_eq!(meses.get(1), None);
    }

    #[test]
    fn missing_columns_are_skipped() {
        let df = DataFrame::new(vec![Series::new("observacao".into(), vec!["ok"]).into()])
            .unwrap();
        let df = Normalizer::normalize(df).unwrap();
        assert_eq!(df.width(), 1);
        assert!(df.column("ano_inicio").is_err());
    }

    #[test]
    fn redcap_columns_are_renamed() {
        let df = DataFrame::new(vec![
            Series::new("redcap_repeat_instrument".into(), vec!["reavaliao"]).into(),
            Series::new("redcap_data_access_group".into(), vec!["neuropediatria"]).into(),
        ])
        .unwrap();

        let df = Normalizer::normalize(df).unwrap();

        assert!(df.column("redcap_repeat_instrument").is_err());
        assert!(df.column("redcap_data_access_group").is_err());
        assert_eq!(str_value(&df, "tipo", 0), Some("Reavaliação".to_string()));
        assert_eq!(str_value(&df, "setor", 0), Some("Neuropediatria".to_string()));
    }

    #[test]
    fn epoch_days_convert_to_dates() {
        assert_eq!(date_from_days(0), NaiveDate::from_ymd_opt(1970, 1, 1));
        assert_eq!(date_from_days(19431), NaiveDate::from_ymd_opt(2023, 3, 15));
    }
}
