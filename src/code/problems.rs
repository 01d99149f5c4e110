use bimap::BiMap;
use once_cell::sync::Lazy;

use crate::error::Error;
use crate::error::Result;
use crate::ini::ParameterFile;

/// Problem generators of Athena++ this crate knows how to configure,
/// by `configure.py --prob` name and short label.
static KNOWN_PROBLEMS: Lazy<BiMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut problems = BiMap::new();
    // Brio & Wu shock tube
    problems.insert("shock_tube", "bw");
    problems.insert("orszag_tang", "ot");
    problems
});

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AthenaProblem {
    name: &'static str,
    label: &'static str,
}

impl AthenaProblem {
    /// Look a problem up by its name or its label.
    pub fn lookup(name_or_label: &str) -> Result<Self> {
        let by_name = || {
            let label = KNOWN_PROBLEMS.get_by_left(name_or_label)?;
            Some((*KNOWN_PROBLEMS.get_by_right(label)?, *label))
        };
        let by_label = || {
            let name = KNOWN_PROBLEMS.get_by_right(name_or_label)?;
            Some((*name, *KNOWN_PROBLEMS.get_by_left(name)?))
        };
        by_name()
            .or_else(by_label)
            .map(|(name, label)| Self { name, label })
            .ok_or_else(|| Error::UnknownProblem {
                problem: name_or_label.to_owned(),
                known: Self::known(),
            })
    }

    /// The problem an Athena input file was written for.
    pub fn from_input(input: &ParameterFile) -> Result<Self> {
        Self::lookup(&input.problem()?)
    }

    pub fn known() -> Vec<String> {
        let mut known: Vec<_> = KNOWN_PROBLEMS
            .left_values()
            .map(|name| name.to_string())
            .collect();
        known.sort();
        known
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

#[cfg(test)]
mod tests {
    use super::AthenaProblem;
    use crate::error::Error;

    #[test]
    fn lookup_by_name_and_label() {
        let by_name = AthenaProblem::lookup("shock_tube").unwrap();
        let by_label = AthenaProblem::lookup("bw").unwrap();
        assert_eq!(by_name, by_label);
        assert_eq!(by_name.name(), "shock_tube");
        assert_eq!(by_name.label(), "bw");
        assert_eq!(AthenaProblem::lookup("ot").unwrap().name(), "orszag_tang");
    }

    #[test]
    fn unknown_problem() {
        match AthenaProblem::lookup("kelvin_helmholtz") {
            Err(Error::UnknownProblem { known, .. }) => {
                assert_eq!(known, vec!["orszag_tang", "shock_tube"])
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
