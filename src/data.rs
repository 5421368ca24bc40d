use std::{
    fmt::Display,
    str::{FromStr, SplitWhitespace},
};

use log::warn;
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    model::{Catalog, FixedPackage, PayPerUsePackage, Request},
};

#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub fixed: Vec<FixedEntry>,
    #[serde(default)]
    pub pay_per_use: Option<PayPerUseEntry>,
}

#[derive(Debug, Deserialize)]
pub struct FixedEntry {
    pub id: u32,
    pub name: String,
    pub price: u64,
    pub volume_budget: u64,
    #[serde(default)]
    pub fee: u64,
    pub duration_budget: u64,
}

#[derive(Debug, Deserialize)]
pub struct PayPerUseEntry {
    pub id: u32,
    pub name: String,
    pub use_rate: u64,
    pub wait_rate: u64,
}

impl CatalogFile {
    pub fn into_catalog(self) -> Result<Catalog> {
        let fixed = self
            .fixed
            .into_iter()
            .map(|entry| FixedPackage {
                id: entry.id,
                name: entry.name,
                price: entry.price,
                volume_budget: entry.volume_budget,
                fee: entry.fee,
                duration_budget: entry.duration_budget,
            })
            .collect();
        let pay_per_use = self.pay_per_use.map(|entry| PayPerUsePackage {
            id: entry.id,
            name: entry.name,
            use_rate: entry.use_rate,
            wait_rate: entry.wait_rate,
        });
        Catalog::new(fixed, pay_per_use)
    }
}

pub fn parse_catalog(json: &[u8]) -> Result<Catalog> {
    serde_json::from_slice::<CatalogFile>(json)?.into_catalog()
}

struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
    position: usize,
}

impl Tokens<'_> {
    fn next<T>(&mut self, what: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.position += 1;
        let position = self.position;
        let token = self.inner.next().ok_or_else(|| Error::MalformedInput {
            position,
            reason: format!("missing {what}"),
        })?;
        token.parse().map_err(|err| Error::MalformedInput {
            position,
            reason: format!("{what} {token:?}: {err}"),
        })
    }
}

/// Parses a request count followed by that many requests.
///
/// Kind `0` is a use request followed by `distance duration`, any other kind
/// is a wait request followed by `duration`.
pub fn parse_requests(text: &str) -> Result<Vec<Request>> {
    let mut tokens = Tokens {
        inner: text.split_whitespace(),
        position: 0,
    };
    let count: usize = tokens.next("request count")?;
    let mut requests = Vec::new();
    for _ in 0..count {
        let kind: i64 = tokens.next("request kind")?;
        let request = if kind == 0 {
            let distance = tokens.next("distance")?;
            let duration = tokens.next("duration")?;
            Request::using(distance, duration)
        } else {
            Request::waiting(tokens.next("duration")?)
        };
        requests.push(request)
    }
    let trailing = tokens.inner.count();
    if trailing > 0 {
        warn!("ignoring {trailing} tokens after {count} requests");
    }
    Ok(requests)
}
