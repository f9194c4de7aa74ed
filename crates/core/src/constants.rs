use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Decimal precision for reported prices, costs and margins
pub const DECIMAL_PRECISION: u32 = 6;

/// Decimal precision for display and cent rounding
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Lower bound (inclusive) of the duty-prepaid price window
pub const DEFAULT_DDP_MIN_PRICE: Decimal = dec!(150);

/// Upper bound (inclusive) of the duty-prepaid price window
pub const DEFAULT_DDP_MAX_PRICE: Decimal = dec!(450);

/// Margin below which a competitor floor raises a red flag
pub const DEFAULT_MINIMUM_ACCEPTABLE_MARGIN: Decimal = dec!(0.05);

/// Neutral starting point for arbitrage scores
pub const NEUTRAL_SCORE: Decimal = dec!(50);

/// Tariff code digit lengths per hierarchy level
pub const CHAPTER_DIGITS: usize = 2;
pub const HEADING_DIGITS: usize = 4;
pub const SUBHEADING_DIGITS: usize = 6;
pub const MIN_FULL_CODE_DIGITS: usize = 8;
pub const MAX_FULL_CODE_DIGITS: usize = 10;
