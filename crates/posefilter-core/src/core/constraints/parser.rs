use super::predicate::{InteractionKind, Predicate};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const CLAUSE_SEPARATOR: char = '-';
const ALTERNATIVE_SEPARATOR: char = ':';

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConstraintSyntaxError {
    #[error("Constraint string is empty")]
    Empty,
    #[error("Empty token in clause '{clause}'")]
    EmptyToken { clause: String },
    #[error("Token '{token}' does not start with a residue number")]
    MissingResidueNumber { token: String },
    #[error("Token '{token}' has no interaction code after its residue number")]
    MissingInteractionCode { token: String },
    #[error("Residue number in token '{token}' is out of range")]
    InvalidResidueNumber { token: String },
    #[error(
        "Unrecognized interaction code '{code}' in token '{token}'. Expected one of B, H, HD, HA, S, C, X."
    )]
    UnknownInteractionCode { token: String, code: String },
}

/// One `<residue_id><predicate_code>` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResidueToken {
    pub residue_id: i32,
    pub kind: InteractionKind,
}

impl FromStr for ResidueToken {
    type Err = ConstraintSyntaxError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let split = token
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(token.len());
        let (digits, code) = token.split_at(split);

        if digits.is_empty() {
            return Err(ConstraintSyntaxError::MissingResidueNumber {
                token: token.to_string(),
            });
        }
        if code.is_empty() {
            return Err(ConstraintSyntaxError::MissingInteractionCode {
                token: token.to_string(),
            });
        }

        let residue_id: i32 =
            digits
                .parse()
                .map_err(|_| ConstraintSyntaxError::InvalidResidueNumber {
                    token: token.to_string(),
                })?;
        let kind = InteractionKind::from_code(code).ok_or_else(|| {
            ConstraintSyntaxError::UnknownInteractionCode {
                token: token.to_string(),
                code: code.to_string(),
            }
        })?;

        Ok(Self { residue_id, kind })
    }
}

/// A residue together with the conjunction of interactions required of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidueConstraint {
    pub residue_id: i32,
    pub predicate: Predicate,
}

/// Parsed form of a constraint string.
///
/// Every referenced residue carries exactly one predicate. Residues that occur in an
/// OR-group are never mandatory, so `mandatory` and the union of `or_groups` partition
/// the referenced residues.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConstraintSet {
    predicates: BTreeMap<i32, Predicate>,
    mandatory: BTreeSet<i32>,
    or_groups: Vec<BTreeSet<i32>>,
}

impl ConstraintSet {
    /// Parses a constraint string such as `45B-67H:68S`.
    pub fn parse(input: &str) -> Result<Self, ConstraintSyntaxError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ConstraintSyntaxError::Empty);
        }

        let mut predicates: BTreeMap<i32, Predicate> = BTreeMap::new();
        let mut or_groups: Vec<BTreeSet<i32>> = Vec::new();

        for clause in input.split(CLAUSE_SEPARATOR) {
            let mut group = BTreeSet::new();
            for raw in clause.split(ALTERNATIVE_SEPARATOR) {
                let raw = raw.trim();
                if raw.is_empty() {
                    return Err(ConstraintSyntaxError::EmptyToken {
                        clause: clause.to_string(),
                    });
                }
                let token: ResidueToken = raw.parse()?;
                predicates
                    .entry(token.residue_id)
                    .and_modify(|p| p.and(token.kind))
                    .or_insert_with(|| Predicate::new(token.kind));
                group.insert(token.residue_id);
            }
            if clause.contains(ALTERNATIVE_SEPARATOR) {
                or_groups.push(group);
            }
        }

        let grouped: BTreeSet<i32> = or_groups.iter().flatten().copied().collect();
        let mandatory = predicates
            .keys()
            .copied()
            .filter(|id| !grouped.contains(id))
            .collect();

        Ok(Self {
            predicates,
            mandatory,
            or_groups,
        })
    }

    pub fn mandatory(&self) -> &BTreeSet<i32> {
        &self.mandatory
    }

    pub fn or_groups(&self) -> &[BTreeSet<i32>] {
        &self.or_groups
    }

    pub fn predicate(&self, residue_id: i32) -> Option<&Predicate> {
        self.predicates.get(&residue_id)
    }

    /// All referenced residues in ascending order.
    pub fn residues(&self) -> impl Iterator<Item = i32> + '_ {
        self.predicates.keys().copied()
    }

    pub fn references(&self, residue_id: i32) -> bool {
        self.predicates.contains_key(&residue_id)
    }

    pub fn constraints(&self) -> impl Iterator<Item = ResidueConstraint> + '_ {
        self.predicates
            .iter()
            .map(|(&residue_id, predicate)| ResidueConstraint {
                residue_id,
                predicate: predicate.clone(),
            })
    }

    fn tokens_for(&self, residue_id: i32) -> Vec<String> {
        self.predicates
            .get(&residue_id)
            .map(|p| p.kinds().map(|k| format!("{}{}", residue_id, k)).collect())
            .unwrap_or_default()
    }
}

impl FromStr for ConstraintSet {
    type Err = ConstraintSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut clauses: Vec<String> = Vec::new();
        for &residue_id in &self.mandatory {
            clauses.extend(self.tokens_for(residue_id));
        }
        for group in &self.or_groups {
            let tokens: Vec<String> = group.iter().flat_map(|&id| self.tokens_for(id)).collect();
            // A single-token group must still read as a group.
            if tokens.len() == 1 {
                clauses.push(format!("{0}{1}{0}", tokens[0], ALTERNATIVE_SEPARATOR));
            } else {
                clauses.push(tokens.join(&ALTERNATIVE_SEPARATOR.to_string()));
            }
        }
        write!(f, "{}", clauses.join(&CLAUSE_SEPARATOR.to_string()))
    }
}
