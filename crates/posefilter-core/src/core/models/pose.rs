/// One pose of the docking container, assembled when its header block closes.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseRecord {
    /// Compound identifier; several poses usually share one name.
    pub compound_name: String,
    /// Zero-based position of the record within its container.
    pub sequence_index: usize,
    /// Total energy score, lower is better.
    pub energy: f64,
    /// Verbatim header block, including line terminators.
    pub header_text: String,
    /// Distance to the reference structure, attached during best-pose selection.
    pub rmsd: Option<f64>,
}

impl PoseRecord {
    pub fn new(
        compound_name: impl Into<String>,
        sequence_index: usize,
        energy: f64,
        header_text: String,
    ) -> Self {
        Self {
            compound_name: compound_name.into(),
            sequence_index,
            energy,
            header_text,
            rmsd: None,
        }
    }

    pub fn with_rmsd(mut self, rmsd: f64) -> Self {
        self.rmsd = Some(rmsd);
        self
    }

    /// Whether this record scores strictly better than `other`.
    pub fn improves_on(&self, other: &PoseRecord) -> bool {
        self.energy < other.energy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_has_no_rmsd() {
        let record = PoseRecord::new("LIG1", 4, -12.5, "##########  Name: LIG1\n".into());
        assert_eq!(record.compound_name, "LIG1");
        assert_eq!(record.sequence_index, 4);
        assert_eq!(record.rmsd, None);
        assert_eq!(record.with_rmsd(1.5).rmsd, Some(1.5));
    }

    #[test]
    fn improves_on_is_strict() {
        let a = PoseRecord::new("LIG1", 0, -3.0, String::new());
        let b = PoseRecord::new("LIG1", 1, -3.0, String::new());
        let c = PoseRecord::new("LIG1", 2, -4.0, String::new());
        assert!(!b.improves_on(&a));
        assert!(c.improves_on(&a));
        assert!(!a.improves_on(&c));
    }
}
