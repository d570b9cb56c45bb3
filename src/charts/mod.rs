//! Charts module - Dashboard chart drawing

mod plotter;

pub use plotter::ChartPlotter;
