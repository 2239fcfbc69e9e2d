//! Conversion Resolver and display formatting.

mod format;
mod resolver;

pub use format::{format_amount, format_money, MAX_DECIMAL_PLACES};
pub use resolver::{apply_offset, ConversionResolver, ConversionResult, RateLookup};
