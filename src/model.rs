use std::{collections::HashSet, fmt::Display};

use serde::Serialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Use,
    Wait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub kind: RequestKind,
    pub duration: u64,
    /// Distance consumed, always 0 for `Wait`.
    pub volume: u64,
}

impl Request {
    pub fn using(volume: u64, duration: u64) -> Self {
        Self {
            kind: RequestKind::Use,
            duration,
            volume,
        }
    }

    pub fn waiting(duration: u64) -> Self {
        Self {
            kind: RequestKind::Wait,
            duration,
            volume: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedPackage {
    pub id: u32,
    pub name: String,
    pub price: u64,
    pub volume_budget: u64,
    /// Display only, never part of the cost.
    pub fee: u64,
    pub duration_budget: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayPerUsePackage {
    pub id: u32,
    pub name: String,
    pub use_rate: u64,
    pub wait_rate: u64,
}

impl PayPerUsePackage {
    /// Price of paying for a single request at the rate of its kind.
    pub fn cost_of(&self, request: &Request) -> Result<u64> {
        let rate = match request.kind {
            RequestKind::Use => self.use_rate,
            RequestKind::Wait => self.wait_rate,
        };
        rate.checked_mul(request.duration).ok_or(Error::CostOverflow)
    }
}

/// Either kind of catalog entry, looked up by id.
#[derive(Debug, Clone, Copy)]
pub enum Package<'a> {
    Fixed(&'a FixedPackage),
    PayPerUse(&'a PayPerUsePackage),
}

impl Display for Package<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Package::Fixed(package) => {
                write!(f, "Buy time limited package with name={}", package.name)
            }
            Package::PayPerUse(package) => write!(
                f,
                "Buy per time pay package with name={} use_cost={} wait_cost={}",
                package.name, package.use_rate, package.wait_rate
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    fixed: Vec<FixedPackage>,
    pay_per_use: Option<PayPerUsePackage>,
}

impl Catalog {
    pub fn new(fixed: Vec<FixedPackage>, pay_per_use: Option<PayPerUsePackage>) -> Result<Self> {
        let mut ids = HashSet::new();
        for id in fixed
            .iter()
            .map(|package| package.id)
            .chain(pay_per_use.iter().map(|package| package.id))
        {
            if !ids.insert(id) {
                return Err(Error::DuplicatePackageId(id));
            }
        }
        Ok(Self { fixed, pay_per_use })
    }

    /// Five time limited packages plus per-minute billing.
    pub fn reference() -> Self {
        let fixed = |id, name: &str, price, volume_budget, duration_budget| FixedPackage {
            id,
            name: name.into(),
            price,
            volume_budget,
            fee: 29,
            duration_budget,
        };
        Self {
            fixed: vec![
                fixed(0, "3-hours", 2400, 35, 3 * 60),
                fixed(1, "6-hours", 3400, 55, 6 * 60),
                fixed(2, "9-hours", 4200, 70, 9 * 60),
                fixed(3, "12-hours", 4900, 80, 12 * 60),
                fixed(4, "1-day", 5900, 105, 24 * 60),
            ],
            pay_per_use: Some(PayPerUsePackage {
                id: 100,
                name: "Pay-per-minute".into(),
                use_rate: 30,
                wait_rate: 7,
            }),
        }
    }

    pub fn fixed(&self) -> &[FixedPackage] {
        &self.fixed
    }

    pub fn pay_per_use(&self) -> Option<&PayPerUsePackage> {
        self.pay_per_use.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.fixed.is_empty() && self.pay_per_use.is_none()
    }

    pub fn package(&self, id: u32) -> Option<Package<'_>> {
        if let Some(package) = self.pay_per_use.as_ref().filter(|package| package.id == id) {
            return Some(Package::PayPerUse(package));
        }
        self.fixed
            .iter()
            .find(|package| package.id == id)
            .map(Package::Fixed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseLine {
    pub package_id: u32,
    /// Summed duration of the requests this line pays for.
    pub effective_duration: u64,
    /// Number of consecutive requests this line pays for.
    pub requests: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Purchase {
    pub total_cost: u64,
    pub lines: Vec<PurchaseLine>,
}

impl Purchase {
    pub fn single(line: PurchaseLine, cost: u64) -> Self {
        Self {
            total_cost: cost,
            lines: vec![line],
        }
    }

    /// Lines of `self` followed by lines of `other`, costs summed.
    pub fn combine(mut self, other: Purchase) -> Result<Self> {
        self.total_cost = self
            .total_cost
            .checked_add(other.total_cost)
            .ok_or(Error::CostOverflow)?;
        self.lines.extend(other.lines);
        Ok(self)
    }
}

/// Text rendering of a purchase against the catalog it was solved with.
pub struct Receipt<'a> {
    pub purchase: &'a Purchase,
    pub catalog: &'a Catalog,
}

impl Display for Receipt<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Purchases for {}", self.purchase.total_cost)?;
        for line in &self.purchase.lines {
            match self.catalog.package(line.package_id) {
                Some(package) => write!(f, "{package}")?,
                None => write!(f, "Unknown package with id={}", line.package_id)?,
            }
            writeln!(f, " for time usage period: {}", line.effective_duration)?
        }
        Ok(())
    }
}
