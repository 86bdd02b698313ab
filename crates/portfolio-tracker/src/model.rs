//! Domain Models
//!
//! Portfolio and holding records as the hosted store returns them, the
//! request bodies that create or change them, and the transient results of
//! a price refresh. Uses `rust_decimal` for all monetary values.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::{PortfolioError, Result};

/// Owner reference used when no auth context exists
pub const PLACEHOLDER_OWNER_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Name given to portfolios created without one
pub const DEFAULT_PORTFOLIO_NAME: &str = "My Portfolio";

/// Largest accepted quantity or unit price. Keeps every product and
/// portfolio total well inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = rust_decimal_macros::dec!(1_000_000_000_000);

/// Opaque record identity. The store may hand out UUIDs or serial integers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl RecordId {
    /// Compare against an id taken from a URL path
    pub fn matches(&self, raw: &str) -> bool {
        match self {
            Self::Number(n) => raw.parse::<i64>().is_ok_and(|r| r == *n),
            Self::Text(s) => s == raw,
        }
    }
}

/// Asset classes. Anything outside the known set is kept verbatim (upper-cased).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssetType {
    #[default]
    Stock,
    Crypto,
    Gold,
    IndexFund,
    Other(String),
}

impl AssetType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Stock => "STOCK",
            Self::Crypto => "CRYPTO",
            Self::Gold => "GOLD",
            Self::IndexFund => "INDEX_FUND",
            Self::Other(label) => label,
        }
    }

    /// Whether holdings of this type trade under a quotable ticker
    pub const fn is_quotable(&self) -> bool {
        matches!(self, Self::Stock | Self::Crypto | Self::Gold | Self::IndexFund)
    }
}

impl From<String> for AssetType {
    fn from(raw: String) -> Self {
        let label = raw.trim().to_uppercase();
        match label.as_str() {
            "STOCK" => Self::Stock,
            "CRYPTO" => Self::Crypto,
            "GOLD" => Self::Gold,
            "INDEX_FUND" => Self::IndexFund,
            _ => Self::Other(label),
        }
    }
}

impl From<&str> for AssetType {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<AssetType> for String {
    fn from(asset_type: AssetType) -> Self {
        asset_type.as_str().to_string()
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A portfolio record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: RecordId,

    pub name: String,

    /// Owner reference (placeholder or absent without auth)
    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Insert payload for a portfolio
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewPortfolio {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// One portfolio line item
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub id: RecordId,

    pub portfolio_id: RecordId,

    /// Upper-case ticker
    #[serde(default, deserialize_with = "null_as_default")]
    pub symbol: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: Decimal,

    /// Average cost basis per unit
    #[serde(default, deserialize_with = "null_as_default")]
    pub average_price: Decimal,

    /// A missing column reads as STOCK; an explicit null stays unknown
    #[serde(default = "default_holding_type")]
    pub asset_type: Option<AssetType>,

    #[serde(default)]
    pub conviction_level: Option<String>,

    #[serde(default)]
    pub investment_thesis: Option<String>,

    #[serde(default)]
    pub risks: Option<String>,

    #[serde(default)]
    pub target_value: Option<Decimal>,

    #[serde(default)]
    pub time_horizon: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    /// Open-ended attributes (asset-specific fields)
    #[serde(default, deserialize_with = "null_as_default")]
    pub details: Map<String, Value>,

    /// Last known market price
    #[serde(default)]
    pub current_price: Option<Decimal>,

    /// ISO-8601 timestamp of the last price write
    #[serde(default)]
    pub last_price_update: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[allow(clippy::unnecessary_wraps)]
const fn default_holding_type() -> Option<AssetType> {
    Some(AssetType::Stock)
}

impl Holding {
    /// Whether a price lookup is attempted for this holding
    pub fn is_price_eligible(&self) -> bool {
        self.asset_type.as_ref().is_some_and(AssetType::is_quotable) && !self.symbol.is_empty()
    }

    /// Total cost of the position, `None` on overflow
    pub fn cost_basis(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.average_price)
    }

    /// Value at the last known price, or at cost when no price is known.
    /// `None` on overflow.
    pub fn market_value(&self) -> Option<Decimal> {
        let price = self
            .current_price
            .filter(|p| !p.is_zero())
            .unwrap_or(self.average_price);
        self.quantity.checked_mul(price)
    }
}

fn default_asset_type() -> String {
    AssetType::Stock.as_str().to_string()
}

/// Request body for adding or replacing a holding
#[derive(Clone, Debug, Deserialize)]
pub struct HoldingRequest {
    pub symbol: String,
    pub quantity: Decimal,
    pub average_price: Decimal,
    #[serde(default = "default_asset_type")]
    pub asset_type: String,
    #[serde(default)]
    pub conviction_level: Option<String>,
    #[serde(default)]
    pub investment_thesis: Option<String>,
    #[serde(default)]
    pub risks: Option<String>,
    #[serde(default)]
    pub target_value: Option<Decimal>,
    #[serde(default)]
    pub time_horizon: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub details: Map<String, Value>,
}

impl HoldingRequest {
    /// Validate and upper-case the request into the stored shape
    pub fn normalize(self) -> Result<HoldingRecord> {
        let symbol = self.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(PortfolioError::Validation("symbol must not be empty".into()));
        }
        if self.quantity.is_sign_negative() && !self.quantity.is_zero() {
            return Err(PortfolioError::Validation(format!(
                "quantity must be non-negative, got {}",
                self.quantity
            )));
        }
        if self.quantity > MAX_AMOUNT {
            return Err(PortfolioError::Validation(format!(
                "quantity must not exceed {MAX_AMOUNT}, got {}",
                self.quantity
            )));
        }
        if self.average_price.abs() > MAX_AMOUNT {
            return Err(PortfolioError::Validation(format!(
                "average_price must not exceed {MAX_AMOUNT} in magnitude, got {}",
                self.average_price
            )));
        }

        Ok(HoldingRecord {
            symbol,
            quantity: self.quantity,
            average_price: self.average_price,
            asset_type: AssetType::from(self.asset_type),
            conviction_level: self.conviction_level,
            investment_thesis: self.investment_thesis,
            risks: self.risks,
            target_value: self.target_value,
            time_horizon: self.time_horizon,
            notes: self.notes,
            details: self.details,
        })
    }
}

/// Normalized holding fields written on add and update.
/// Optional fields serialize as `null` so an update clears them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HoldingRecord {
    pub symbol: String,
    pub quantity: Decimal,
    pub average_price: Decimal,
    pub asset_type: AssetType,
    pub conviction_level: Option<String>,
    pub investment_thesis: Option<String>,
    pub risks: Option<String>,
    pub target_value: Option<Decimal>,
    pub time_horizon: Option<String>,
    pub notes: Option<String>,
    pub details: Map<String, Value>,
}

/// Price write performed by the refresh pipeline
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceUpdate {
    pub current_price: Decimal,
    pub last_price_update: DateTime<Utc>,
}

impl PriceUpdate {
    pub fn now(price: Decimal) -> Self {
        Self {
            current_price: price,
            last_price_update: Utc::now(),
        }
    }
}

/// Aggregate report of one price refresh pass
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RefreshResult {
    /// Holdings whose price was written
    pub updated: usize,

    /// `Failed {symbol}: {message}` entries in processing order
    pub errors: Vec<String>,

    /// Ineligible holdings (not part of the response)
    #[serde(skip)]
    pub skipped: usize,

    /// Eligible holdings for which no usable price came back
    #[serde(skip)]
    pub unpriced: usize,
}

impl RefreshResult {
    /// Number of holdings a price lookup was attempted for
    pub fn eligible(&self) -> usize {
        self.updated + self.unpriced + self.errors.len()
    }
}

/// Allocation of portfolio value to one asset type
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AssetAllocation {
    /// `None` for holdings stored without a type
    pub asset_type: Option<AssetType>,
    pub value: Decimal,
    pub percent: Decimal,
}

/// Cost, value and allocation totals for a portfolio
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PortfolioValuation {
    pub portfolio_id: String,
    pub holdings: usize,
    pub total_cost: Decimal,
    pub total_value: Decimal,
    pub unrealized_pnl: Decimal,
    pub unrealized_pnl_percent: Decimal,
    pub allocations: Vec<AssetAllocation>,
}

/// `part` as a percentage of `whole`, rounded to cents
fn percent_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }
    part.checked_div(whole)?
        .checked_mul(Decimal::from(100))
        .map(|p| p.round_dp(2))
}

impl PortfolioValuation {
    /// Totals over `holdings`. Sums that leave `Decimal` range are rejected.
    pub fn from_holdings(portfolio_id: impl Into<String>, holdings: &[Holding]) -> Result<Self> {
        let portfolio_id = portfolio_id.into();
        let overflow = || {
            PortfolioError::Validation(format!(
                "portfolio {portfolio_id} value exceeds the supported range"
            ))
        };

        let mut total_cost = Decimal::ZERO;
        let mut total_value = Decimal::ZERO;
        let mut by_type: BTreeMap<Option<AssetType>, Decimal> = BTreeMap::new();

        for holding in holdings {
            let cost = holding.cost_basis().ok_or_else(overflow)?;
            let value = holding.market_value().ok_or_else(overflow)?;
            total_cost = total_cost.checked_add(cost).ok_or_else(overflow)?;
            total_value = total_value.checked_add(value).ok_or_else(overflow)?;

            let slot = by_type.entry(holding.asset_type.clone()).or_default();
            *slot = slot.checked_add(value).ok_or_else(overflow)?;
        }

        let unrealized_pnl = total_value.checked_sub(total_cost).ok_or_else(overflow)?;
        let unrealized_pnl_percent = percent_of(unrealized_pnl, total_cost).ok_or_else(overflow)?;

        let mut allocations = Vec::with_capacity(by_type.len());
        for (asset_type, value) in by_type {
            allocations.push(AssetAllocation {
                asset_type,
                value,
                percent: percent_of(value, total_value).ok_or_else(overflow)?,
            });
        }
        allocations.sort_by(|a, b| b.value.cmp(&a.value));

        Ok(Self {
            portfolio_id,
            holdings: holdings.len(),
            total_cost,
            total_value,
            unrealized_pnl,
            unrealized_pnl_percent,
            allocations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn holding(symbol: &str, asset_type: &str, quantity: Decimal, avg: Decimal) -> Holding {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "portfolio_id": "p1",
            "symbol": symbol,
            "quantity": quantity,
            "average_price": avg,
            "asset_type": asset_type,
        }))
        .unwrap()
    }

    #[test]
    fn test_asset_type_normalization() {
        assert_eq!(AssetType::from("stock"), AssetType::Stock);
        assert_eq!(AssetType::from(" index_fund "), AssetType::IndexFund);
        assert_eq!(AssetType::from("bond"), AssetType::Other("BOND".into()));
        assert!(!AssetType::from("REAL_ESTATE").is_quotable());
        assert_eq!(serde_json::to_value(AssetType::IndexFund).unwrap(), "INDEX_FUND");
    }

    #[test]
    fn test_holding_reads_store_row() {
        let row = serde_json::json!({
            "id": "9b7e",
            "portfolio_id": "p1",
            "symbol": "AAPL",
            "quantity": 10,
            "average_price": 150.5,
            "asset_type": null,
            "details": null,
            "current_price": null,
            "created_at": "2025-01-01T00:00:00+00:00"
        });
        let h: Holding = serde_json::from_value(row).unwrap();

        assert_eq!(h.id, RecordId::Text("9b7e".into()));
        assert_eq!(h.asset_type, None);
        assert_eq!(h.quantity, dec!(10));
        assert_eq!(h.average_price, dec!(150.5));
        assert!(h.details.is_empty());
        assert!(!h.is_price_eligible());
    }

    #[test]
    fn test_holding_without_type_column_reads_as_stock() {
        let h: Holding = serde_json::from_value(serde_json::json!({
            "id": 3, "portfolio_id": "p1", "symbol": "MSFT", "quantity": 1, "average_price": 300
        }))
        .unwrap();

        assert_eq!(h.asset_type, Some(AssetType::Stock));
        assert!(h.is_price_eligible());
    }

    #[test]
    fn test_eligibility_requires_symbol_and_quotable_type() {
        assert!(!holding("", "STOCK", dec!(1), dec!(1)).is_price_eligible());
        assert!(!holding("XYZ", "BOND", dec!(1), dec!(1)).is_price_eligible());
        assert!(holding("GC=F", "GOLD", dec!(1), dec!(1)).is_price_eligible());
    }

    #[test]
    fn test_request_normalizes_case() {
        let request: HoldingRequest = serde_json::from_value(serde_json::json!({
            "symbol": "aapl",
            "quantity": 10,
            "average_price": 150.0,
            "asset_type": "stock"
        }))
        .unwrap();
        let record = request.normalize().unwrap();

        assert_eq!(record.symbol, "AAPL");
        assert_eq!(record.asset_type, AssetType::Stock);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["asset_type"], "STOCK");
        assert_eq!(json["notes"], Value::Null);
        assert_eq!(json["average_price"], 150.0);
    }

    #[test]
    fn test_request_defaults_asset_type() {
        let request: HoldingRequest = serde_json::from_value(serde_json::json!({
            "symbol": "msft", "quantity": 1, "average_price": 300
        }))
        .unwrap();
        assert_eq!(request.normalize().unwrap().asset_type, AssetType::Stock);
    }

    #[test]
    fn test_request_rejects_negative_quantity() {
        let request: HoldingRequest = serde_json::from_value(serde_json::json!({
            "symbol": "AAPL", "quantity": -1, "average_price": 150
        }))
        .unwrap();
        assert!(matches!(request.normalize(), Err(PortfolioError::Validation(_))));
    }

    #[test]
    fn test_request_rejects_out_of_range_amounts() {
        for body in [
            serde_json::json!({"symbol": "AAPL", "quantity": 1e20, "average_price": 1}),
            serde_json::json!({"symbol": "AAPL", "quantity": 1, "average_price": 1e20}),
            serde_json::json!({"symbol": "AAPL", "quantity": 1, "average_price": -1e20}),
        ] {
            let request: HoldingRequest = serde_json::from_value(body).unwrap();
            assert!(matches!(request.normalize(), Err(PortfolioError::Validation(_))));
        }

        let request: HoldingRequest = serde_json::from_value(serde_json::json!({
            "symbol": "AAPL", "quantity": 1_000_000_000_000_i64, "average_price": 1_000_000_000_000_i64
        }))
        .unwrap();
        assert!(request.normalize().is_ok());
    }

    #[test]
    fn test_record_id_matches_path() {
        assert!(RecordId::Number(42).matches("42"));
        assert!(!RecordId::Number(42).matches("abc"));
        assert!(RecordId::from("abc").matches("abc"));
    }

    #[test]
    fn test_valuation() {
        let mut aapl = holding("AAPL", "STOCK", dec!(10), dec!(100));
        aapl.current_price = Some(dec!(150));
        let gold = holding("GOLD BAR", "GOLD", dec!(1), dec!(500));

        let valuation = PortfolioValuation::from_holdings("p1", &[aapl, gold]).unwrap();

        assert_eq!(valuation.total_cost, dec!(1500));
        assert_eq!(valuation.total_value, dec!(2000));
        assert_eq!(valuation.unrealized_pnl, dec!(500));
        assert_eq!(valuation.unrealized_pnl_percent, dec!(33.33));
        assert_eq!(valuation.allocations[0].asset_type, Some(AssetType::Stock));
        assert_eq!(valuation.allocations[0].percent, dec!(75));
        assert_eq!(valuation.allocations[1].percent, dec!(25));
    }

    #[test]
    fn test_valuation_of_empty_portfolio() {
        let valuation = PortfolioValuation::from_holdings("p1", &[]).unwrap();
        assert_eq!(valuation.total_value, Decimal::ZERO);
        assert_eq!(valuation.unrealized_pnl_percent, Decimal::ZERO);
        assert!(valuation.allocations.is_empty());
    }

    #[test]
    fn test_valuation_overflow_is_an_error() {
        // Rows written by other clients bypass request bounds
        let mut huge = holding("AAPL", "STOCK", dec!(1), dec!(2));
        huge.quantity = Decimal::MAX;
        let err = PortfolioValuation::from_holdings("p1", &[huge]).unwrap_err();
        assert!(matches!(err, PortfolioError::Validation(_)));

        let mut big = holding("AAPL", "STOCK", dec!(1), dec!(1));
        big.quantity = Decimal::MAX;
        let err = PortfolioValuation::from_holdings("p1", &[big.clone(), big]).unwrap_err();
        assert!(err.to_string().contains("p1"));
    }

    #[test]
    fn test_refresh_result_wire_shape() {
        let result = RefreshResult {
            updated: 1,
            errors: vec!["Failed BTC-USD: not found".into()],
            skipped: 1,
            unpriced: 0,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"updated": 1, "errors": ["Failed BTC-USD: not found"]})
        );
        assert_eq!(result.eligible(), 2);
    }
}
