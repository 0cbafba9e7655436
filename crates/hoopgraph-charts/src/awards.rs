// Award taxonomy: place cutoffs per family and the display order.

use std::collections::BTreeSet;

use hoopgraph_core::config::AwardConfig;
use tracing::{debug, warn};

/// Category rank for families outside the table.
pub const UNRANKED: u32 = 999;

/// How many places of a family survive normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cutoff {
    /// Places `1..=n` are kept; unparseable places are kept too.
    Top(u32),
    /// Only place `n` is kept; unparseable places are dropped.
    Exactly(u32),
    /// Every place is kept.
    Unlimited,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardFamily {
    pub prefix: String,
    pub cutoff: Cutoff,
    pub rank: u32,
}

const BUILTIN_FAMILIES: &[(&str, Cutoff, u32)] = &[
    ("MVP", Cutoff::Top(5), 1),
    ("AS", Cutoff::Unlimited, 2),
    ("DPOY", Cutoff::Top(5), 3),
    ("NBA", Cutoff::Top(3), 4),
    ("DEF", Cutoff::Top(2), 5),
    ("ROY", Cutoff::Exactly(1), 6),
    ("6MOY", Cutoff::Top(5), 7),
    ("MIP", Cutoff::Top(5), 8),
    ("CPOY", Cutoff::Top(5), 9),
];

/// Place suffix of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Place {
    None,
    Rank(u32),
    Unparseable,
}

/// Split `MVP-2` / `NBA1` / `AS` into family prefix and place.
fn split_token(token: &str) -> (&str, Place) {
    if let Some((head, tail)) = token.rsplit_once('-') {
        let place = match tail.trim().parse() {
            Ok(n) => Place::Rank(n),
            Err(_) => Place::Unparseable,
        };
        return (head.trim(), place);
    }
    let head = token.trim_end_matches(|c: char| c.is_ascii_digit());
    if head.len() == token.len() || head.is_empty() {
        return (token, Place::None);
    }
    match token[head.len()..].parse() {
        Ok(n) => (head, Place::Rank(n)),
        Err(_) => (head, Place::Unparseable),
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// The family table with any configured cutoff overrides applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardRules {
    families: Vec<AwardFamily>,
}

impl Default for AwardRules {
    fn default() -> Self {
        Self {
            families: BUILTIN_FAMILIES
                .iter()
                .map(|(prefix, cutoff, rank)| AwardFamily {
                    prefix: (*prefix).to_string(),
                    cutoff: *cutoff,
                    rank: *rank,
                })
                .collect(),
        }
    }
}

impl AwardRules {
    /// Built-in table with `[awards.cutoffs]` applied. An exact-place family
    /// keeps its exact handling with the new place; a family missing from the
    /// table is appended as unranked.
    pub fn from_config(config: &AwardConfig) -> Self {
        let mut rules = Self::default();
        for (prefix, &n) in &config.cutoffs {
            match rules.families.iter_mut().find(|f| f.prefix == *prefix) {
                Some(family) => {
                    family.cutoff = match family.cutoff {
                        Cutoff::Exactly(_) => Cutoff::Exactly(n),
                        _ => Cutoff::Top(n),
                    };
                }
                None => {
                    warn!("award cutoff for unknown family '{}' added as unranked", prefix);
                    rules.families.push(AwardFamily {
                        prefix: prefix.clone(),
                        cutoff: Cutoff::Top(n),
                        rank: UNRANKED,
                    });
                }
            }
        }
        rules
    }

    pub fn families(&self) -> &[AwardFamily] {
        &self.families
    }

    fn family(&self, prefix: &str) -> Option<&AwardFamily> {
        self.families
            .iter()
            .find(|f| f.prefix.eq_ignore_ascii_case(prefix))
    }

    /// Whether `token` survives its family's cutoff. Unknown families always do.
    pub fn keeps(&self, token: &str) -> bool {
        let (prefix, place) = split_token(token);
        let Some(family) = self.family(prefix) else {
            return true;
        };
        match (family.cutoff, place) {
            (_, Place::None) | (Cutoff::Unlimited, _) => true,
            (Cutoff::Top(n), Place::Rank(p)) => p <= n,
            (Cutoff::Top(_), Place::Unparseable) => true,
            (Cutoff::Exactly(n), Place::Rank(p)) => p == n,
            (Cutoff::Exactly(_), Place::Unparseable) => false,
        }
    }

    /// Display-order bucket of `token`'s family.
    pub fn rank(&self, token: &str) -> u32 {
        let (prefix, _) = split_token(token);
        self.family(prefix).map_or(UNRANKED, |f| f.rank)
    }

    /// Trim, de-duplicate, apply cutoffs, and sort by category rank then
    /// alphabetically.
    pub fn normalize<I, S>(&self, tokens: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        let total = distinct.len();

        let mut kept: Vec<(u32, String)> = distinct
            .into_iter()
            .filter(|t| self.keeps(t))
            .map(|t| (self.rank(&t), t))
            .collect();
        kept.sort();

        debug!("award normalization kept {} of {} tokens", kept.len(), total);
        kept.into_iter().map(|(_, t)| t).collect()
    }
}

/// Normalize with the built-in table.
pub fn normalize_awards<I, S>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    AwardRules::default().normalize(tokens)
}
