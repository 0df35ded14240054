//! Exchanges module - canonical trade records and venue normalization.

mod model;
mod normalizer;


pub use model::{AssetMovement, MovementCategory, RawMovement, RawTrade, Trade, TradeType};
pub use normalizer::TradeNormalizer;
