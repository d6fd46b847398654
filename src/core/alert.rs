//! Alert value types
//!
//! An `Alert` is one subscriber's threshold condition on one symbol.
//! Identifiers (`SubscriberId`, `Symbol`) are newtypes so the store and
//! the evaluator cannot mix them up with arbitrary strings or integers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::watchlist::WatchlistError;

// ============================================================================
// Identifiers
// ============================================================================

/// Notification target (one per chat/session)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub i64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SubscriberId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Case-normalized market ticker (e.g. "TCS.NS")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    /// Trim and upper-case a raw ticker
    ///
    /// Only ticker characters are accepted: ASCII letters and digits plus
    /// `.`, `^`, `=`, `-` and `&` (e.g. `TCS.NS`, `^NSEI`, `EURUSD=X`, `M&M.NS`).
    pub fn parse(raw: &str) -> Result<Self, WatchlistError> {
        let normalized = raw.trim().to_ascii_uppercase();
        if normalized.is_empty() || !normalized.chars().all(is_ticker_char) {
            return Err(WatchlistError::InvalidSymbol(raw.to_string()));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_ticker_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '^' | '=' | '-' | '&')
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Operator
// ============================================================================

/// Comparison direction for a threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Fires when price >= threshold
    Gte,
    /// Fires when price <= threshold
    Lte,
}

impl Operator {
    /// Exact comparison, no tolerance.
    pub fn matches(self, price: f64, threshold: f64) -> bool {
        match self {
            Operator::Gte => price >= threshold,
            Operator::Lte => price <= threshold,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Gte => ">=",
            Operator::Lte => "<=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = WatchlistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            ">=" => Ok(Operator::Gte),
            "<=" => Ok(Operator::Lte),
            other => Err(WatchlistError::InvalidOperator(other.to_string())),
        }
    }
}

// ============================================================================
// Alert
// ============================================================================

/// One threshold condition
///
/// `id` identifies the add-instance: replacing an alert for the same symbol
/// yields a new id, which lets the engine tell a stale trigger apart from a
/// fresh replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub id: Uuid,
    pub symbol: Symbol,
    pub operator: Operator,
    pub threshold: f64,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    /// Build a validated alert. Threshold must be finite and non-negative.
    pub fn new(symbol: Symbol, operator: Operator, threshold: f64) -> Result<Self, WatchlistError> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(WatchlistError::InvalidThreshold(threshold));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            symbol,
            operator,
            threshold,
            created_at: Utc::now(),
        })
    }

    pub fn is_triggered_by(&self, price: f64) -> bool {
        self.operator.matches(price, self.threshold)
    }

    /// Same add-instance (not just same condition)
    pub fn same_instance(&self, other: &Alert) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.symbol, self.operator, self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::parse(s).unwrap()
    }

    #[test]
    fn test_symbol_is_normalized() {
        assert_eq!(sym("  tcs.ns ").as_str(), "TCS.NS");
        assert_eq!(sym("Infy"), sym("INFY"));
    }

    #[test]
    fn test_symbol_rejects_empty_and_inner_whitespace() {
        assert!(Symbol::parse("").is_err());
        assert!(Symbol::parse("   ").is_err());
        assert!(Symbol::parse("TC S").is_err());
    }

    #[test]
    fn test_symbol_rejects_url_metacharacters() {
        for raw in ["TCS.NS#BOGUS", "TCS.NS?X=1", "FOO/../TCS.NS", "TCS%2F", "ТCS"] {
            assert!(
                matches!(Symbol::parse(raw), Err(WatchlistError::InvalidSymbol(_))),
                "Expected InvalidSymbol for {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_symbol_accepts_exchange_tickers() {
        for raw in ["^nsei", "eurusd=x", "m&m.ns", "brk-b"] {
            assert!(Symbol::parse(raw).is_ok(), "Expected {:?} to parse", raw);
        }
    }

    #[test]
    fn test_operator_parse() {
        assert_eq!(">=".parse::<Operator>().unwrap(), Operator::Gte);
        assert_eq!("<=".parse::<Operator>().unwrap(), Operator::Lte);
        assert!(">".parse::<Operator>().is_err());
        assert!("=>".parse::<Operator>().is_err());
    }

    #[test]
    fn test_operator_equality_boundary() {
        assert!(Operator::Gte.matches(4200.0, 4200.0));
        assert!(Operator::Lte.matches(4200.0, 4200.0));
        assert!(!Operator::Gte.matches(4199.99, 4200.0));
        assert!(!Operator::Lte.matches(4200.01, 4200.0));
    }

    #[test]
    fn test_alert_rejects_bad_thresholds() {
        assert!(matches!(
            Alert::new(sym("TCS"), Operator::Gte, -1.0),
            Err(WatchlistError::InvalidThreshold(_))
        ));
        assert!(Alert::new(sym("TCS"), Operator::Gte, f64::NAN).is_err());
        assert!(Alert::new(sym("TCS"), Operator::Gte, f64::INFINITY).is_err());
        assert!(Alert::new(sym("TCS"), Operator::Lte, 0.0).is_ok());
    }

    #[test]
    fn test_each_alert_is_a_new_instance() {
        let a = Alert::new(sym("TCS"), Operator::Gte, 4200.0).unwrap();
        let b = Alert::new(sym("TCS"), Operator::Gte, 4200.0).unwrap();
        assert!(!a.same_instance(&b));
        assert!(a.same_instance(&a.clone()));
    }

    #[test]
    fn test_alert_display() {
        let a = Alert::new(sym("tcs"), Operator::Gte, 4200.0).unwrap();
        assert_eq!(a.to_string(), "TCS >= 4200");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn gte_triggers_iff_price_at_or_above(price in 0.0f64..1e9, threshold in 0.0f64..1e9) {
                let alert = Alert::new(sym("X"), Operator::Gte, threshold).unwrap();
                prop_assert_eq!(alert.is_triggered_by(price), price >= threshold);
            }

            #[test]
            fn lte_triggers_iff_price_at_or_below(price in 0.0f64..1e9, threshold in 0.0f64..1e9) {
                let alert = Alert::new(sym("X"), Operator::Lte, threshold).unwrap();
                prop_assert_eq!(alert.is_triggered_by(price), price <= threshold);
            }

            #[test]
            fn equality_always_triggers(threshold in 0.0f64..1e9) {
                for op in [Operator::Gte, Operator::Lte] {
                    let alert = Alert::new(sym("X"), op, threshold).unwrap();
                    prop_assert!(alert.is_triggered_by(threshold));
                }
            }
        }
    }
}
