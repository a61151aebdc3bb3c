use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One closed OHLCV bar supplied by the host. The window is ordered
/// oldest first and only ever appended to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Direction of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// The order side that opens a position in this direction.
    pub fn entry_order_side(self) -> OrderSide {
        match self {
            Side::Long => OrderSide::Buy,
            Side::Short => OrderSide::Sell,
        }
    }

    /// +1 for long, -1 for short. Multiplies a percentage move so that a
    /// positive result is always in the position's favor.
    pub fn sign(self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}

/// Side of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// An instruction the strategy asks the host to apply. The host owns
/// execution; these are quantity-price pairs only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    Entry {
        side: OrderSide,
        quantity: f64,
        price: f64,
    },
    TakeProfit {
        quantity: f64,
        price: f64,
    },
    StopLoss {
        quantity: f64,
        price: f64,
    },
}

impl Instruction {
    pub fn quantity(&self) -> f64 {
        match self {
            Instruction::Entry { quantity, .. }
            | Instruction::TakeProfit { quantity, .. }
            | Instruction::StopLoss { quantity, .. } => *quantity,
        }
    }

    pub fn price(&self) -> f64 {
        match self {
            Instruction::Entry { price, .. }
            | Instruction::TakeProfit { price, .. }
            | Instruction::StopLoss { price, .. } => *price,
        }
    }
}

/// Confirmation from the host that an entry order filled and a position
/// is now open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fill {
    pub pair: String,
    pub side: Side,
    pub entry_price: f64,
    pub quantity: f64,
    pub timestamp: DateTime<Utc>,
}

/// Report from the host that the open position was closed, either by a
/// take-profit/stop-loss hit or externally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedPosition {
    pub pair: String,
    pub exit_price: f64,
    /// Realized PnL in quote currency.
    pub pnl: f64,
    /// Realized PnL as a percentage of the position's entry value.
    pub pnl_percentage: f64,
    pub timestamp: DateTime<Utc>,
}

/// Available capital as reported by the host for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub available_margin: f64,
    /// Fee rate as a fraction (0.001 = 0.1%).
    pub fee_rate: f64,
}
