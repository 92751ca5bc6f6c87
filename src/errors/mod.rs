pub mod startup_error;
pub mod stock_error;
