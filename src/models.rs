// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Exchange behind a trade account. Unknown providers are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Provider {
    Binance,
    Bybit,
    Okex,
    Other(String),
}

impl From<String> for Provider {
    fn from(s: String) -> Self {
        match s.to_uppercase().as_str() {
            "BINANCE" => Provider::Binance,
            "BYBIT" => Provider::Bybit,
            "OKEX" => Provider::Okex,
            _ => Provider::Other(s),
        }
    }
}

impl From<Provider> for String {
    fn from(p: Provider) -> Self {
        p.to_string()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Binance => f.write_str("BINANCE"),
            Provider::Bybit => f.write_str("BYBIT"),
            Provider::Okex => f.write_str("OKEX"),
            Provider::Other(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    pub name: String,
    pub provider: Provider,
}

/// Income ledger category as reported by the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IncomeType {
    Transfer,
    RealizedPnl,
    FundingFee,
    Commission,
    InsuranceClear,
    ReferralKickback,
    CommissionDiscount,
    FeeBurn,
    Other(String),
}

impl IncomeType {
    /// Income types that count towards trading PnL. Transfers and the
    /// exchange's non-trading adjustments are excluded.
    pub fn is_pnl(&self) -> bool {
        matches!(
            self,
            IncomeType::RealizedPnl
                | IncomeType::FundingFee
                | IncomeType::Commission
                | IncomeType::InsuranceClear
                | IncomeType::ReferralKickback
                | IncomeType::CommissionDiscount
                | IncomeType::FeeBurn
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            IncomeType::Transfer => "TRANSFER",
            IncomeType::RealizedPnl => "REALIZED_PNL",
            IncomeType::FundingFee => "FUNDING_FEE",
            IncomeType::Commission => "COMMISSION",
            IncomeType::InsuranceClear => "INSURANCE_CLEAR",
            IncomeType::ReferralKickback => "REFERRAL_KICKBACK",
            IncomeType::CommissionDiscount => "COMMISSION_DISCOUNT",
            IncomeType::FeeBurn => "FEE_BURN",
            IncomeType::Other(s) => s,
        }
    }
}

impl From<String> for IncomeType {
    fn from(s: String) -> Self {
        match s.trim().to_uppercase().as_str() {
            "TRANSFER" => IncomeType::Transfer,
            "REALIZED_PNL" => IncomeType::RealizedPnl,
            "FUNDING_FEE" => IncomeType::FundingFee,
            "COMMISSION" => IncomeType::Commission,
            "INSURANCE_CLEAR" => IncomeType::InsuranceClear,
            "REFERRAL_KICKBACK" => IncomeType::ReferralKickback,
            "COMMISSION_DISCOUNT" => IncomeType::CommissionDiscount,
            "FEE_BURN" => IncomeType::FeeBurn,
            _ => IncomeType::Other(s),
        }
    }
}

impl From<IncomeType> for String {
    fn from(t: IncomeType) -> Self {
        t.as_str().to_string()
    }
}

impl FromStr for IncomeType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(IncomeType::from(s.to_string()))
    }
}

impl fmt::Display for IncomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One income ledger row exactly as the API returns it. `income` stays a
/// string here (numbers and null are accepted and stringified); it is parsed
/// once when the record becomes an `IncomeEntry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeRecord {
    #[serde(default)]
    pub symbol: String,
    pub income_type: IncomeType,
    #[serde(default, deserialize_with = "lenient_string")]
    pub income: String,
    #[serde(default)]
    pub asset: String,
    #[serde(default)]
    pub info: String,
    pub time: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tran_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub trade_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    #[serde(default)]
    pub account_alias: String,
    pub asset: String,
    pub balance: Decimal,
    #[serde(default)]
    pub cross_wallet_balance: Decimal,
    #[serde(default)]
    pub cross_un_pnl: Decimal,
    #[serde(default)]
    pub available_balance: Decimal,
    #[serde(default)]
    pub max_withdraw_amount: Decimal,
    #[serde(default)]
    pub margin_available: bool,
    #[serde(default)]
    pub update_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRisk {
    pub symbol: String,
    pub position_amt: Decimal,
    pub entry_price: Decimal,
    #[serde(default)]
    pub mark_price: Decimal,
    #[serde(default, alias = "unRealizedProfit")]
    pub unrealized_profit: Decimal,
    #[serde(default)]
    pub liquidation_price: Decimal,
    #[serde(default)]
    pub leverage: String,
    #[serde(default)]
    pub margin_type: String,
    #[serde(default)]
    pub position_side: String,
    #[serde(default)]
    pub notional: Decimal,
    #[serde(default)]
    pub update_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub symbol: String,
    pub order_id: i64,
    #[serde(default)]
    pub client_order_id: String,
    pub price: Decimal,
    pub orig_qty: Decimal,
    #[serde(default)]
    pub executed_qty: Decimal,
    pub status: String,
    #[serde(default)]
    pub time_in_force: String,
    #[serde(rename = "type")]
    pub r#type: String,
    pub side: String,
    #[serde(default)]
    pub stop_price: Decimal,
    pub time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeHistoryItem {
    pub symbol: String,
    pub id: i64,
    pub order_id: i64,
    pub price: Decimal,
    pub qty: Decimal,
    #[serde(default)]
    pub quote_qty: Decimal,
    #[serde(default)]
    pub commission: Decimal,
    #[serde(default)]
    pub commission_asset: String,
    pub time: i64,
    #[serde(default, alias = "buyer")]
    pub is_buyer: bool,
    #[serde(default, alias = "maker")]
    pub is_maker: bool,
    #[serde(default)]
    pub position_side: String,
    pub side: String,
    #[serde(default)]
    pub realized_pnl: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub total_wallet_balance: Decimal,
    #[serde(default)]
    pub total_unrealized_profit: Decimal,
    #[serde(default)]
    pub total_margin_balance: Decimal,
    #[serde(default)]
    pub total_initial_margin: Decimal,
    #[serde(default)]
    pub total_maint_margin: Decimal,
    #[serde(default)]
    pub available_balance: Decimal,
    #[serde(default)]
    pub max_withdraw_amount: Decimal,
    pub time: i64,
}

// Ids and amounts arrive as JSON strings from some routes and as numbers (or
// null) from others.
fn lenient_string<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn income_record_accepts_exchange_payload() {
        let raw = json!({
            "symbol": "BTCUSDT",
            "incomeType": "REALIZED_PNL",
            "income": "-0.37500000",
            "asset": "USDT",
            "info": "",
            "time": 1_714_521_600_000_i64,
            "tranId": 9689322392_i64,
            "tradeId": ""
        });
        let rec: IncomeRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(rec.income_type, IncomeType::RealizedPnl);
        assert_eq!(rec.income, "-0.37500000");
        assert_eq!(rec.tran_id, "9689322392");
        assert_eq!(rec.trade_id, "");
    }

    #[test]
    fn unknown_income_type_is_preserved() {
        let t = IncomeType::from("COIN_SWAP_DEPOSIT".to_string());
        assert_eq!(t, IncomeType::Other("COIN_SWAP_DEPOSIT".into()));
        assert!(!t.is_pnl());
        assert_eq!(String::from(t), "COIN_SWAP_DEPOSIT");
    }

    #[test]
    fn pnl_types_exclude_transfers() {
        assert!(IncomeType::FeeBurn.is_pnl());
        assert!(IncomeType::CommissionDiscount.is_pnl());
        assert!(!IncomeType::Transfer.is_pnl());
    }

    #[test]
    fn account_ignores_credentials_and_numeric_ids() {
        let raw = json!({
            "id": 42,
            "userId": "u1",
            "name": "Main",
            "apiKey": "k",
            "secretKey": "s",
            "provider": "BINANCE",
            "createdAt": "2025-01-01T00:00:00Z"
        });
        let acct: Account = serde_json::from_value(raw).unwrap();
        assert_eq!(acct.id, "42");
        assert_eq!(acct.provider, Provider::Binance);
    }

    #[test]
    fn position_accepts_exchange_spelling() {
        let raw = json!({
            "symbol": "ETHUSDT",
            "positionAmt": "0.500",
            "entryPrice": "3000.0",
            "markPrice": "3100.0",
            "unRealizedProfit": "50.00000000",
            "leverage": "10",
            "positionSide": "BOTH",
            "updateTime": 1
        });
        let p: PositionRisk = serde_json::from_value(raw).unwrap();
        assert_eq!(p.unrealized_profit, Decimal::new(50, 0));
    }
}
