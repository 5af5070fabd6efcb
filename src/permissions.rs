//! Compiles directory-service group names into read-permission patterns.
//!
//! Group names encode authorization informally: a small allow-list marks
//! support staff, `<code>data` marks instrument staff, and
//! `<number>-dmgt` / `<number>-part` mark proposal membership. Three
//! disjoint rule classes turn those names into path glob patterns; every
//! matching class applies, so a user can hold instrument *and* proposal
//! patterns at once.

use std::path::Path;

use regex::Regex;

use crate::constants::{
    DATA_MANAGEMENT_SUFFIX, INSTRUMENT_CODES, PARTICIPANT_SUFFIX, PROPOSAL_NUMBER_WIDTH,
    SUPPORT_GROUPS,
};
use crate::error::{DatagateError, Result};

/// Path glob patterns (literal segments plus `*`) the user may read,
/// derived from their group names.
#[must_use]
pub fn read_permissions(root: &Path, groups: &[String]) -> Vec<String> {
    let root = root.display();

    // Support staff see the whole tree; the single wildcard subsumes
    // every other rule.
    if groups
        .iter()
        .any(|group| SUPPORT_GROUPS.contains(&group.as_str()))
    {
        return vec![format!("{root}/*")];
    }

    let mut patterns = Vec::new();

    // Instrument staff: `<code>data` grants the instrument subtree.
    for code in INSTRUMENT_CODES {
        let staff_group = format!("{code}data");
        if groups
            .iter()
            .any(|group| group.eq_ignore_ascii_case(&staff_group))
        {
            patterns.push(format!("{root}/{}/*", code.to_ascii_uppercase()));
        }
    }

    // Proposal membership. The instrument and cycle segments are not
    // encoded in the group name, so they stay wildcarded.
    for group in groups {
        if !group.ends_with(DATA_MANAGEMENT_SUFFIX) && !group.ends_with(PARTICIPANT_SUFFIX) {
            continue;
        }
        let token = group.split('-').next().unwrap_or("");
        let number = normalize_proposal_number(token);
        patterns.push(format!("{root}/*/*/p{number}"));
    }

    patterns
}

/// Canonical proposal number from a group-name token: strip the leading
/// `6`s and zeros, left-pad to six digits.
#[must_use]
pub fn normalize_proposal_number(token: &str) -> String {
    let stripped = token.trim_start_matches('6').trim_start_matches('0');
    let width = PROPOSAL_NUMBER_WIDTH;
    format!("{stripped:0>width$}")
}

/// Compile glob patterns to regexes: `*` becomes `.*`, every other
/// character is literal (no `?`, no character classes). Matching is
/// anchored at the start of the candidate path only, so a proposal
/// pattern matches catalog entries that continue past the proposal
/// segment.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            let literal: Vec<String> = pattern.split('*').map(regex::escape).collect();
            let source = format!("^{}", literal.join(".*"));
            Regex::new(&source).map_err(|err| DatagateError::InvalidPattern {
                pattern: pattern.clone(),
                reason: err.to_string(),
            })
        })
        .collect()
}

/// True when `candidate` matches at least one compiled pattern.
#[must_use]
pub fn matches_any(candidate: &str, patterns: &[Regex]) -> bool {
    patterns.iter().any(|pattern| pattern.is_match(candidate))
}
