use crate::core::toolkit::{HBondDirection, InteractionClass};
use std::collections::BTreeSet;
use std::fmt;

/// The fixed vocabulary of interaction tags usable in a constraint string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InteractionKind {
    SaltBridge,                // B
    HydrogenBond,              // H  - any intermolecular hydrogen bond
    LigandDonatesHydrogenBond, // HD
    LigandAcceptsHydrogenBond, // HA
    PiStacking,                // S
    CationPi,                  // C
    HalogenBond,               // X
}

impl InteractionKind {
    pub const ALL: [InteractionKind; 7] = [
        InteractionKind::SaltBridge,
        InteractionKind::HydrogenBond,
        InteractionKind::LigandDonatesHydrogenBond,
        InteractionKind::LigandAcceptsHydrogenBond,
        InteractionKind::PiStacking,
        InteractionKind::CationPi,
        InteractionKind::HalogenBond,
    ];

    /// Looks up a constraint code. Codes are case-sensitive.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "B" => Some(InteractionKind::SaltBridge),
            "H" => Some(InteractionKind::HydrogenBond),
            "HD" => Some(InteractionKind::LigandDonatesHydrogenBond),
            "HA" => Some(InteractionKind::LigandAcceptsHydrogenBond),
            "S" => Some(InteractionKind::PiStacking),
            "C" => Some(InteractionKind::CationPi),
            "X" => Some(InteractionKind::HalogenBond),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            InteractionKind::SaltBridge => "B",
            InteractionKind::HydrogenBond => "H",
            InteractionKind::LigandDonatesHydrogenBond => "HD",
            InteractionKind::LigandAcceptsHydrogenBond => "HA",
            InteractionKind::PiStacking => "S",
            InteractionKind::CationPi => "C",
            InteractionKind::HalogenBond => "X",
        }
    }

    /// Whether a perceived interaction of class `class` carries this tag.
    pub fn matches(self, class: InteractionClass) -> bool {
        match self {
            InteractionKind::SaltBridge => class == InteractionClass::SaltBridge,
            InteractionKind::HydrogenBond => matches!(class, InteractionClass::HydrogenBond(_)),
            InteractionKind::LigandDonatesHydrogenBond => {
                class == InteractionClass::HydrogenBond(HBondDirection::LigandDonates)
            }
            InteractionKind::LigandAcceptsHydrogenBond => {
                class == InteractionClass::HydrogenBond(HBondDirection::LigandAccepts)
            }
            InteractionKind::PiStacking => class == InteractionClass::PiStacking,
            InteractionKind::CationPi => class == InteractionClass::CationPi,
            InteractionKind::HalogenBond => class == InteractionClass::HalogenBond,
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A conjunction of interaction tags required of a single residue.
///
/// Re-declaring a residue merges its tags, so `10H-10B` and `10B-10H` produce the
/// same predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Predicate {
    kinds: BTreeSet<InteractionKind>,
}

impl Predicate {
    pub fn new(kind: InteractionKind) -> Self {
        Self {
            kinds: BTreeSet::from([kind]),
        }
    }

    /// Logical AND with another tag.
    pub fn and(&mut self, kind: InteractionKind) {
        self.kinds.insert(kind);
    }

    pub fn kinds(&self) -> impl Iterator<Item = InteractionKind> + '_ {
        self.kinds.iter().copied()
    }

    pub fn is_conjunction(&self) -> bool {
        self.kinds.len() > 1
    }

    /// Whether one perceived interaction satisfies every tag of the conjunction.
    pub fn accepts(&self, class: InteractionClass) -> bool {
        self.kinds.iter().all(|kind| kind.matches(class))
    }

    /// Whether any of the residue's perceived interactions satisfies the predicate.
    pub fn is_satisfied_by<I>(&self, classes: I) -> bool
    where
        I: IntoIterator<Item = InteractionClass>,
    {
        classes.into_iter().any(|class| self.accepts(class))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<&str> = self.kinds.iter().map(|k| k.code()).collect();
        write!(f, "{}", codes.join("&"))
    }
}
