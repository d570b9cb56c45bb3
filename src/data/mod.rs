//! Data module - codebook, CSV loading, normalization, and filtering

pub mod codebook;
mod filters;
mod loader;
mod normalizer;

pub use filters::{FilterError, FilterOptions, FilterSelection, FilterSelector, MonthFilter};
pub use loader::{DataLoader, LoaderError};
pub use normalizer::{date_from_days, Normalizer, NormalizerError};
