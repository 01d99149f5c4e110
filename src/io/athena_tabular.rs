use std::fs;
use std::path::Path;
use std::path::PathBuf;

use log::debug;
use ndarray::Array1;
use ndarray::Ix1;

use super::fields::MagneticField;
use super::fields::PrimitiveFields;
use super::Profile;
use crate::error::Error;
use crate::error::IoResultExt;
use crate::error::Result;

/// Column layout of an Athena++ tabular dump of the primitive
/// variables, used when the file carries no column header.
const DEFAULT_COLUMNS: [&str; 10] = [
    "i", "x1v", "rho", "press", "vel1", "vel2", "vel3", "Bcc1", "Bcc2", "Bcc3",
];

/// A one-dimensional Athena++ `.tab` output.
#[derive(Clone, Debug)]
pub struct AthenaTabular {
    /// Cell indices.
    pub cells: Array1<f64>,
    /// Cell-center coordinates.
    pub x: Array1<f64>,
    pub fields: PrimitiveFields<Ix1>,
    /// Simulation time, if the file header states it.
    pub time: Option<f64>,
}

struct Table {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    time: Option<f64>,
}

impl Table {
    fn parse(path: &Path, contents: &str) -> Result<Self> {
        let mut header: Option<Vec<String>> = None;
        let mut time = None;
        let mut columns: Vec<Vec<f64>> = vec![];
        for (index, line) in contents.lines().enumerate() {
            let line_number = index + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(comment) = line.strip_prefix('#') {
                if time.is_none() {
                    time = parse_time(comment);
                }
                let names: Vec<_> = comment.split_whitespace().collect();
                if names.iter().any(|name| *name == "x1v" || *name == "rho") {
                    header = Some(names.into_iter().map(|name| name.to_owned()).collect());
                }
                continue;
            }
            let row = line
                .split_whitespace()
                .map(|value| value.parse::<f64>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| Error::Tabular {
                    path: path.to_owned(),
                    line: line_number,
                    message: e.to_string(),
                })?;
            if columns.is_empty() {
                columns = vec![vec![]; row.len()];
            }
            if row.len() != columns.len() {
                return Err(Error::Tabular {
                    path: path.to_owned(),
                    line: line_number,
                    message: format!("expected {} columns, found {}", columns.len(), row.len()),
                });
            }
            for (column, value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }
        if columns.is_empty() {
            return Err(Error::Tabular {
                path: path.to_owned(),
                line: 0,
                message: "no data rows".into(),
            });
        }
        let names = header.unwrap_or_else(|| {
            DEFAULT_COLUMNS
                .iter()
                .map(|name| name.to_string())
                .collect()
        });
        Ok(Self {
            names,
            columns,
            time,
        })
    }

    fn get(&self, name: &str) -> Option<Array1<f64>> {
        self.names
            .iter()
            .position(|column| column == name)
            .and_then(|index| self.columns.get(index))
            .map(|column| Array1::from_vec(column.clone()))
    }

    fn require(&self, path: &Path, name: &str) -> Result<Array1<f64>> {
        self.get(name).ok_or_else(|| Error::MissingDataset {
            file: path.to_owned(),
            name: name.to_owned(),
        })
    }

    fn num_rows(&self) -> usize {
        self.columns[0].len()
    }
}

/// Reads `time=0.1` out of the first header line.
fn parse_time(comment: &str) -> Option<f64> {
    comment
        .split_whitespace()
        .find_map(|token| token.strip_prefix("time="))
        .and_then(|value| value.parse().ok())
}

impl AthenaTabular {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_owned()));
        }
        let contents = fs::read_to_string(path).at_path(path)?;
        let table = Table::parse(path, &contents)?;
        debug!(
            "Read {} rows with columns {:?} from {:?}",
            table.num_rows(),
            table.names,
            path
        );
        let magnetic = match (table.get("Bcc1"), table.get("Bcc2"), table.get("Bcc3")) {
            (Some(bx), Some(by), Some(bz)) => Some(MagneticField { bx, by, bz }),
            _ => None,
        };
        let fields = PrimitiveFields {
            rho: table.require(path, "rho")?,
            p: table.require(path, "press")?,
            u: table.require(path, "vel1")?,
            v: table.require(path, "vel2")?,
            w: table.require(path, "vel3")?,
            magnetic,
            div_b: table.get("divB"),
        };
        Ok(Self {
            cells: table
                .get("i")
                .unwrap_or_else(|| Array1::from_iter((0..table.num_rows()).map(|i| i as f64))),
            x: table.require(path, "x1v")?,
            fields,
            time: table.time,
        })
    }

    /// Shift the coordinates by the magnitude of the first one, so
    /// that a domain starting at `-0.5` starts at `0`.
    pub fn rescale(&mut self) {
        if let Some(first) = self.x.first().copied() {
            self.x.mapv_inplace(|x| x + first.abs());
        }
    }
}

impl Profile for AthenaTabular {
    fn coordinates(&self) -> &Array1<f64> {
        &self.x
    }

    fn fields(&self) -> &PrimitiveFields<Ix1> {
        &self.fields
    }
}

/// The last `.tab` file in `dir`, by name. With the Athena++ naming
/// scheme this is the latest output.
pub fn latest_tabular_file(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let mut files = vec![];
    for entry in fs::read_dir(dir).at_path(dir)? {
        let path = entry.at_path(dir)?.path();
        if path.extension().map(|ext| ext == "tab").unwrap_or(false) {
            files.push(path);
        }
    }
    files.sort();
    files
        .pop()
        .ok_or_else(|| Error::FileNotFound(dir.join("*.tab")))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use ndarray::array;
    use tempfile::TempDir;

    use super::latest_tabular_file;
    use super::AthenaTabular;
    use crate::error::Error;
    use crate::test_utils::ATHENA_TABULAR;

    fn load(contents: &str) -> crate::error::Result<AthenaTabular> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Brio-Wu.block0.out1.00010.tab");
        fs::write(&path, contents).unwrap();
        AthenaTabular::load(&path)
    }

    #[test]
    fn load_mhd_output() {
        let data = load(ATHENA_TABULAR).unwrap();
        assert_eq!(data.time, Some(0.1));
        assert_eq!(data.cells, array![0.0, 1.0, 2.0]);
        assert_eq!(data.x, array![-4.99375e-01, -4.98125e-01, -4.96875e-01]);
        assert_eq!(data.fields.rho, array![1.0, 0.999, 0.125]);
        assert_eq!(data.fields.p, array![1.0, 0.998, 0.1]);
        assert_eq!(data.fields.u[1], 1e-3);
        assert_eq!(data.fields.v[2], 2e-3);
        let magnetic = data.fields.magnetic.unwrap();
        assert_eq!(magnetic.bx, array![0.75, 0.75, 0.75]);
        assert_eq!(magnetic.by, array![1.0, 0.999, -1.0]);
        assert!(data.fields.div_b.is_none());
    }

    #[test]
    fn columns_are_mapped_by_name() {
        let contents = "# x1v i press rho vel1 vel2 vel3\n0.5 3 2.0 1.0 0.0 0.0 0.0\n";
        let data = load(contents).unwrap();
        assert_eq!(data.cells, array![3.0]);
        assert_eq!(data.x, array![0.5]);
        assert_eq!(data.fields.rho, array![1.0]);
        assert_eq!(data.fields.p, array![2.0]);
        assert!(data.fields.magnetic.is_none());
    }

    #[test]
    fn positional_columns_without_header() {
        let contents = "0 0.25 1.0 2.0 3.0 4.0 5.0 6.0 7.0 8.0\n";
        let data = load(contents).unwrap();
        assert_eq!(data.fields.w, array![5.0]);
        assert_eq!(data.fields.magnetic.unwrap().bz, array![8.0]);
        assert_eq!(data.time, None);
    }

    #[test]
    fn hydro_output_without_magnetic_field() {
        let contents = "0 0.25 1.0 2.0 3.0 4.0 5.0\n1 0.75 1.0 2.0 3.0 4.0 5.0\n";
        let data = load(contents).unwrap();
        assert!(data.fields.magnetic.is_none());
    }

    #[test]
    fn ragged_rows() {
        let contents = "0 0.25 1.0 2.0 3.0 4.0 5.0\n1 0.75 1.0\n";
        assert!(matches!(load(contents), Err(Error::Tabular { line: 2, .. })));
    }

    #[test]
    fn missing_column() {
        let contents = "# i x1v rho\n0 0.25 1.0\n";
        match load(contents) {
            Err(Error::MissingDataset { name, .. }) => assert_eq!(name, "press"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rescale_shifts_domain_to_origin() {
        let mut data = load(ATHENA_TABULAR).unwrap();
        data.rescale();
        assert_eq!(data.x[0], 0.0);
        assert!((data.x[2] - 0.0025).abs() < 1e-12);
    }

    #[test]
    fn latest_file_by_name() {
        let dir = TempDir::new().unwrap();
        for name in ["bw.out1.00002.tab", "bw.out1.00010.tab", "bw.out1.00009.tab", "bw.hst"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        assert_eq!(
            latest_tabular_file(dir.path()).unwrap(),
            dir.path().join("bw.out1.00010.tab")
        );
    }

    #[test]
    fn no_tabular_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            latest_tabular_file(dir.path()),
            Err(Error::FileNotFound(_))
        ));
    }
}
