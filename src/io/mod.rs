mod athena_tabular;
mod export;
mod fields;
mod fv2d;

use std::path::Path;
use std::path::PathBuf;

use linked_hash_map::LinkedHashMap;
use log::warn;
use ndarray::Array1;
use ndarray::Ix1;
use serde::Serialize;

pub use self::athena_tabular::latest_tabular_file;
pub use self::athena_tabular::AthenaTabular;
pub use self::export::write_columns;
pub use self::fields::FieldSummary;
pub use self::fields::MagneticField;
pub use self::fields::PrimitiveFields;
pub use self::fv2d::iterations;
pub use self::fv2d::Fv2dProfile;
pub use self::fv2d::Fv2dSnapshot;
use crate::error::Error;
use crate::error::Result;

/// One-dimensional output that can be compared across codes.
pub trait Profile {
    fn coordinates(&self) -> &Array1<f64>;
    fn fields(&self) -> &PrimitiveFields<Ix1>;
}

/// An overview of an output file, as printed by `inspect`.
#[derive(Serialize)]
pub struct Summary {
    pub file: PathBuf,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub iterations: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iteration: Option<usize>,
    pub fields: LinkedHashMap<String, FieldSummary>,
}

fn is_hdf5(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "h5" || ext == "hdf5")
        .unwrap_or(false)
}

fn load_fv2d(path: &Path, iteration: Option<usize>) -> Result<Fv2dSnapshot> {
    match iteration {
        Some(iteration) => Fv2dSnapshot::load_iteration(path, iteration),
        None => Fv2dSnapshot::load(path),
    }
}

fn no_iterations(path: &Path) -> Error {
    Error::Parameters(format!("{path:?} is not an fv2d file, it has no iterations"))
}

impl Summary {
    /// Summarize an HDF5 file from fv2d (the latest or the given
    /// iteration) or an Athena `.tab` file, depending on the extension.
    pub fn of_file(path: &Path, iteration: Option<usize>) -> Result<Self> {
        if is_hdf5(path) {
            let snapshot = load_fv2d(path, iteration)?;
            Ok(Self {
                file: path.to_owned(),
                kind: "fv2d",
                time: None,
                iterations: iterations(path)?,
                iteration: snapshot.iteration,
                fields: snapshot.fields.summary(),
            })
        } else {
            if iteration.is_some() {
                return Err(no_iterations(path));
            }
            let data = AthenaTabular::load(path)?;
            Ok(Self {
                file: path.to_owned(),
                kind: "athena",
                time: data.time,
                iterations: vec![],
                iteration: None,
                fields: data.fields.summary(),
            })
        }
    }
}

/// Load a one-dimensional profile from either kind of output file.
/// For fv2d files, `row` selects the row of the snapshot. `shift`
/// moves Athena coordinates to start at zero.
pub fn load_profile(
    path: &Path,
    iteration: Option<usize>,
    row: usize,
    shift: bool,
) -> Result<Box<dyn Profile>> {
    if is_hdf5(path) {
        if shift {
            warn!("Coordinates of fv2d output are not shifted");
        }
        Ok(Box::new(load_fv2d(path, iteration)?.profile_row(row)?))
    } else {
        if iteration.is_some() {
            return Err(no_iterations(path));
        }
        let mut data = AthenaTabular::load(path)?;
        if shift {
            data.rescale();
        }
        Ok(Box::new(data))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::load_profile;
    use super::Summary;
    use crate::test_utils::fv2d_test_value;
    use crate::test_utils::write_fv2d_file;
    use crate::test_utils::ATHENA_TABULAR;

    #[test]
    fn summary_of_tabular_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bw.out1.00010.tab");
        fs::write(&path, ATHENA_TABULAR).unwrap();
        let summary = Summary::of_file(&path, None).unwrap();
        assert_eq!(summary.kind, "athena");
        assert_eq!(summary.time, Some(0.1));
        let rho = &summary.fields["rho"];
        assert_eq!(rho.shape, vec![3]);
        assert_eq!(rho.max, 1.0);
        assert_eq!(rho.min, 0.125);
        let yaml = serde_yaml::to_string(&summary).unwrap();
        assert!(yaml.contains("kind: athena"));
        assert!(!yaml.contains("iterations"));
    }

    #[test]
    fn summary_of_hdf5_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run_bw.h5");
        write_fv2d_file(&path, Some(&[0, 3]), 4, 2, false);
        let summary = Summary::of_file(&path, None).unwrap();
        assert_eq!(summary.kind, "fv2d");
        assert_eq!(summary.iterations, vec![0, 3]);
        assert_eq!(summary.iteration, Some(3));
        assert_eq!(summary.fields["rho"].shape, vec![2, 4]);
        assert!(!summary.fields.contains_key("bx"));
        assert!(summary.fields.contains_key("div_b"));
    }

    #[test]
    fn summary_of_given_iteration() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run_bw.h5");
        write_fv2d_file(&path, Some(&[0, 3]), 4, 2, false);
        let summary = Summary::of_file(&path, Some(0)).unwrap();
        assert_eq!(summary.iteration, Some(0));
        assert_eq!(summary.fields["rho"].max, fv2d_test_value(0, 0, 1, 3));
    }

    #[test]
    fn profiles_of_both_codes() {
        let dir = TempDir::new().unwrap();
        let tab = dir.path().join("bw.out1.00010.tab");
        fs::write(&tab, ATHENA_TABULAR).unwrap();
        let profile = load_profile(&tab, None, 0, true).unwrap();
        assert_eq!(profile.coordinates()[0], 0.0);
        assert!(load_profile(&tab, Some(1), 0, false).is_err());

        let h5 = dir.path().join("run_bw.h5");
        write_fv2d_file(&h5, Some(&[2]), 4, 2, true);
        let profile = load_profile(&h5, None, 1, false).unwrap();
        assert_eq!(profile.coordinates().len(), 4);
        assert_eq!(profile.fields().rho[0], fv2d_test_value(2, 0, 1, 0));
    }
}
