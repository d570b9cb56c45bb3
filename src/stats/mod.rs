//! Stats module - Frequency tables and the monthly series

mod frequency;

pub use frequency::{
    chart_plan, ChartKind, ChartSpec, FrequencyCounter, FrequencyEntry, FrequencyTable, MonthCount,
};
