//! Select-option matching.
//!
//! Maps a free-text target onto one option of a select. Rules are tried in
//! order and the first hit wins; all comparisons are case-insensitive.
//!
//! 1. option value equals the target
//! 2. option text equals the target
//! 3. option text contains the target
//! 4. option value contains the target
//! 5. years: a range token (`3 to 5 years` -> `3-5`) found in text or value
//! 6. region: target and option denote the same known country
//! 7. demographic label: target is a known label contained in text or value

use once_cell::sync::Lazy;
use regex::Regex;

use smartfill_protocols::SelectOption;

static RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(?:to|-)\s*(\d+)|\d+").unwrap());

/// A recognised country: long name plus accepted aliases.
struct Region {
    name: &'static str,
    aliases: &'static [&'static str],
}

impl Region {
    fn is_alias(&self, candidate: &str) -> bool {
        self.aliases.iter().any(|alias| *alias == candidate)
    }
}

const REGIONS: &[Region] = &[
    Region {
        name: "india",
        aliases: &["india", "in", "ind"],
    },
    Region {
        name: "united states",
        aliases: &["united states", "usa", "us", "u.s.", "america"],
    },
    Region {
        name: "united kingdom",
        aliases: &["united kingdom", "uk", "gb", "great britain", "england"],
    },
    Region {
        name: "canada",
        aliases: &["canada", "ca"],
    },
    Region {
        name: "germany",
        aliases: &["germany", "de", "deutschland"],
    },
    Region {
        name: "australia",
        aliases: &["australia", "au"],
    },
];

const DEMOGRAPHIC_LABELS: &[&str] = &["male", "female", "non-binary", "other", "prefer not to say"];

/// Index of the option matching `target`, if any rule hits.
pub fn best_option(options: &[SelectOption], target: &str) -> Option<usize> {
    let target = target.trim().to_lowercase();
    if target.is_empty() {
        return None;
    }

    let lowered: Vec<(String, String)> = options
        .iter()
        .map(|o| (o.value.to_lowercase(), o.text.trim().to_lowercase()))
        .collect();

    position(&lowered, |value, _| value == target)
        .or_else(|| position(&lowered, |_, text| text == target))
        .or_else(|| position(&lowered, |_, text| text.contains(&target)))
        .or_else(|| position(&lowered, |value, _| value.contains(&target)))
        .or_else(|| {
            let token = range_token(&target)?;
            position(&lowered, |value, text| {
                text.contains(&token) || value.contains(&token)
            })
        })
        .or_else(|| {
            let region = region_of(&target)?;
            position(&lowered, |value, text| {
                text.contains(region.name) || region.is_alias(value) || region.is_alias(text)
            })
        })
        .or_else(|| {
            if !DEMOGRAPHIC_LABELS.iter().any(|label| *label == target) {
                return None;
            }
            position(&lowered, |value, text| {
                text.contains(&target) || value.contains(&target)
            })
        })
}

fn position(
    options: &[(String, String)],
    pred: impl Fn(&str, &str) -> bool,
) -> Option<usize> {
    options.iter().position(|(value, text)| pred(value, text))
}

/// Normalised range token of a target that mentions years.
fn range_token(target: &str) -> Option<String> {
    if !target.contains("year") {
        return None;
    }
    let caps = RANGE_RE.captures(target)?;
    match (caps.get(1), caps.get(2)) {
        (Some(from), Some(to)) => Some(format!("{}-{}", from.as_str(), to.as_str())),
        _ => caps.get(0).map(|m| m.as_str().to_string()),
    }
}

fn region_of(target: &str) -> Option<&'static Region> {
    REGIONS
        .iter()
        .find(|region| region.is_alias(target) || target.contains(region.name))
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;
