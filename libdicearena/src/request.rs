//! Roll requests: which dice to throw, and how many of each.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::DieType;
use crate::error::{Result, RollError};

/// Die type → count. An empty request is valid and resolves to nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRequest {
    counts: BTreeMap<DieType, u32>,
}

impl RollRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` dice of `die`, accumulating with earlier additions.
    pub fn with(mut self, die: DieType, count: u32) -> Self {
        self.add(die, count);
        self
    }

    /// Counts saturate at `u32::MAX`; the cap check rejects them later.
    pub fn add(&mut self, die: DieType, count: u32) {
        if count > 0 {
            let entry = self.counts.entry(die).or_insert(0);
            *entry = entry.saturating_add(count);
        }
    }

    /// Builds a request from host-side identifiers such as `("d6", 2)`.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        let mut request = Self::new();
        for (id, count) in pairs {
            request.add(id.as_ref().parse()?, count);
        }
        Ok(request)
    }

    pub fn count(&self, die: DieType) -> u32 {
        self.counts.get(&die).copied().unwrap_or(0)
    }

    pub fn total_dice(&self) -> u32 {
        self.counts.values().fold(0, |acc, c| acc.saturating_add(*c))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Die types in catalog order with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (DieType, u32)> + '_ {
        self.counts.iter().map(|(d, c)| (*d, *c))
    }

    /// Rejects any per-type count above `cap`.
    pub fn validate(&self, cap: u32) -> Result<()> {
        for (die, count) in self.iter() {
            if count > cap {
                return Err(RollError::TooManyDice { die, count, cap });
            }
        }
        Ok(())
    }
}

impl FromStr for RollRequest {
    type Err = RollError;

    /// Parses whitespace- or comma-separated dice notation: `2d6 d20, 3D4`.
    fn from_str(s: &str) -> Result<Self> {
        let mut request = Self::new();
        for token in s
            .split(|c: char| c.is_whitespace() || c == ',' || c == '+')
            .filter(|t| !t.is_empty())
        {
            let (die, count) = parse_dice_notation(token)?;
            request.add(die, count);
        }
        Ok(request)
    }
}

/// Parse one `NdS` token. A missing count means one die.
pub fn parse_dice_notation(token: &str) -> Result<(DieType, u32)> {
    let upper = token.to_uppercase();
    let invalid = || RollError::InvalidNotation(token.to_string());

    let (count_str, sides_str) = upper.split_once('D').ok_or_else(invalid)?;
    if sides_str.is_empty() {
        return Err(invalid());
    }
    let count = if count_str.is_empty() {
        1
    } else {
        count_str.parse::<u32>().map_err(|_| invalid())?
    };
    let sides = sides_str.parse::<u32>().map_err(|_| invalid())?;
    let die =
        DieType::from_sides(sides).ok_or_else(|| RollError::UnknownDieType(format!("d{sides}")))?;
    Ok((die, count))
}
