// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether a transaction brings stock in (`buy`) or takes it out (`sell`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "buy",
            Direction::Sell => "sell",
        }
    }

    /// Catalog side that prices this direction.
    pub fn side(&self) -> Side {
        match self {
            Direction::Buy => Side::Buy,
            Direction::Sell => Side::Sales,
        }
    }

    /// Trader category auto-assigned to a new counterparty.
    pub fn trader_kind(&self) -> TraderKind {
        match self {
            Direction::Buy => TraderKind::Dealer,
            Direction::Sell => TraderKind::Customer,
        }
    }
}

impl FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(Direction::Buy),
            "sell" => Ok(Direction::Sell),
            other => Err(anyhow!("Invalid direction '{}', expected buy|sell", other)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Purchased,
    Booked,
    Returned,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Purchased => "purchased",
            Status::Booked => "booked",
            Status::Returned => "returned",
        }
    }
}

impl FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "purchased" => Ok(Status::Purchased),
            "booked" => Ok(Status::Booked),
            "returned" => Ok(Status::Returned),
            other => Err(anyhow!(
                "Invalid status '{}', expected purchased|booked|returned",
                other
            )),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which catalog a price list entry belongs to. Also used as the "mode"
/// most commands operate in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Sales,
    Buy,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Sales => "sales",
            Side::Buy => "buy",
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Side::Sales => Direction::Sell,
            Side::Buy => Direction::Buy,
        }
    }

    pub fn trader_kind(&self) -> TraderKind {
        self.direction().trader_kind()
    }
}

impl FromStr for Side {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sales" | "sell" => Ok(Side::Sales),
            "buy" => Ok(Side::Buy),
            other => Err(anyhow!("Invalid mode '{}', expected sales|buy", other)),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraderKind {
    Customer,
    Dealer,
}

impl TraderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraderKind::Customer => "Customer",
            TraderKind::Dealer => "Dealer",
        }
    }
}

impl FromStr for TraderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "customer" => Ok(TraderKind::Customer),
            "dealer" => Ok(TraderKind::Dealer),
            other => Err(anyhow!(
                "Invalid trader type '{}', expected Customer|Dealer",
                other
            )),
        }
    }
}

impl fmt::Display for TraderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    pub name: String,
    #[serde(rename = "type")]
    pub direction: Direction,
    pub product: String,
    pub size: String,
    pub qty: i64,
    pub amount: Decimal,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promise_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    #[serde(rename = "type")]
    pub side: Side,
    pub product: String,
    pub size: String,
    pub price: Decimal,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trader {
    pub id: i64,
    pub name: String,
    pub contact: String,
    #[serde(rename = "type")]
    pub kind: TraderKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: crate::permissions::Role,
    #[serde(default)]
    pub permissions: crate::permissions::PermissionSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: i64,
    pub user: String,
    pub role: String,
    pub action: String,
    pub details: serde_json::Value,
    pub timestamp: String,
}
