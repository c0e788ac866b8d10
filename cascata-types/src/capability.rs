use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// High-level capability labels for routing, errors, cache keys, and telemetry.
///
/// Each label corresponds to one provider chain. Adding a capability means adding
/// a role trait in `cascata-core` and an endpoint on the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Capability {
    /// Point-in-time quote for a single symbol.
    Quote,
    /// Daily OHLCV history.
    History,
    /// Currency pair rates.
    Forex,
    /// Macro-economic release calendar.
    EconomicCalendar,
    /// Corporate earnings calendar.
    Earnings,
    /// Insider transactions for a symbol.
    InsiderTrades,
}

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Quote,
        Self::History,
        Self::Forex,
        Self::EconomicCalendar,
        Self::Earnings,
        Self::InsiderTrades,
    ];

    /// Stable, kebab-case identifier for logs/errors/config keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::History => "history",
            Self::Forex => "forex",
            Self::EconomicCalendar => "economic-calendar",
            Self::Earnings => "earnings",
            Self::InsiderTrades => "insider-trades",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = crate::CascataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| crate::CascataError::InvalidArg(format!("unknown capability: {s}")))
    }
}
