use std::path::Path;

use hdf5::File;
use hdf5::Group;
use log::debug;
use ndarray::s;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::Ix1;
use ndarray::Ix2;

use super::fields::MagneticField;
use super::fields::PrimitiveFields;
use super::Profile;
use crate::error::Error;
use crate::error::Result;

const ITERATION_PREFIX: &str = "ite_";

/// A snapshot written by fv2d. Fields are stored as `(Ny, Nx)`
/// arrays, the coordinates as flat arrays over all cells.
#[derive(Clone, Debug)]
pub struct Fv2dSnapshot {
    pub x: Array1<f64>,
    pub y: Array1<f64>,
    /// The iteration the fields were read from. `None` for files that
    /// store a single snapshot at the root.
    pub iteration: Option<usize>,
    pub fields: PrimitiveFields<Ix2>,
}

/// A one-dimensional cut through an fv2d snapshot along x.
#[derive(Clone, Debug)]
pub struct Fv2dProfile {
    pub x: Array1<f64>,
    pub fields: PrimitiveFields<Ix1>,
}

fn iteration_group_name(iteration: usize) -> String {
    format!("{ITERATION_PREFIX}{iteration:04}")
}

fn parse_iteration(name: &str) -> Option<usize> {
    let digits = name.strip_prefix(ITERATION_PREFIX)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn open(path: &Path) -> Result<File> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_owned()));
    }
    Ok(File::open(path)?)
}

fn file_iterations(file: &File) -> Result<Vec<usize>> {
    let mut iterations: Vec<_> = file
        .member_names()?
        .iter()
        .filter_map(|name| parse_iteration(name))
        .collect();
    iterations.sort_unstable();
    Ok(iterations)
}

/// All iterations stored in the file, in ascending order.
pub fn iterations(path: impl AsRef<Path>) -> Result<Vec<usize>> {
    file_iterations(&open(path.as_ref())?)
}

struct SnapshotReader<'a> {
    path: &'a Path,
    group: &'a Group,
    members: Vec<String>,
}

impl<'a> SnapshotReader<'a> {
    fn new(path: &'a Path, group: &'a Group) -> Result<Self> {
        Ok(Self {
            path,
            group,
            members: group.member_names()?,
        })
    }

    fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|member| member == name)
    }

    fn missing(&self, name: &str) -> Error {
        Error::MissingDataset {
            file: self.path.to_owned(),
            name: name.to_owned(),
        }
    }

    fn read_flat(&self, name: &str) -> Result<Array1<f64>> {
        if !self.contains(name) {
            return Err(self.missing(name));
        }
        Ok(Array1::from_vec(self.group.dataset(name)?.read_raw::<f64>()?))
    }

    /// Reads a field as a two-dimensional array. One-dimensional
    /// datasets become a single row.
    fn read_field(&self, name: &str) -> Result<Array2<f64>> {
        if !self.contains(name) {
            return Err(self.missing(name));
        }
        let data = self.group.dataset(name)?.read_dyn::<f64>()?;
        let shape = data.shape().to_vec();
        let result = match shape.len() {
            1 => data.into_shape((1, shape[0])).map_err(|e| e.to_string()),
            2 => data.into_dimensionality::<Ix2>().map_err(|e| e.to_string()),
            _ => Err(format!("expected at most two dimensions, found {:?}", shape)),
        };
        result.map_err(|message| Error::Shape(format!("{name} in {:?}: {message}", self.path)))
    }

    fn read_optional_field(&self, name: &str) -> Result<Option<Array2<f64>>> {
        if self.contains(name) {
            self.read_field(name).map(Some)
        } else {
            Ok(None)
        }
    }

    fn read_fields(&self) -> Result<PrimitiveFields<Ix2>> {
        let magnetic = match (
            self.read_optional_field("bx")?,
            self.read_optional_field("by")?,
            self.read_optional_field("bz")?,
        ) {
            (Some(bx), Some(by), Some(bz)) => Some(MagneticField { bx, by, bz }),
            _ => None,
        };
        let fields = PrimitiveFields {
            rho: self.read_field("rho")?,
            p: self.read_field("prs")?,
            u: self.read_field("u")?,
            v: self.read_field("v")?,
            w: self.read_field("w")?,
            magnetic,
            div_b: self.read_optional_field("divB")?,
        };
        self.check_shapes(&fields)?;
        Ok(fields)
    }

    /// Every field must have the shape of `rho`.
    fn check_shapes(&self, fields: &PrimitiveFields<Ix2>) -> Result<()> {
        let expected = fields.rho.shape();
        for (name, field) in fields.named() {
            if field.shape() != expected {
                return Err(Error::Shape(format!(
                    "{name} in {:?} has shape {:?}, rho has {:?}",
                    self.path,
                    field.shape(),
                    expected
                )));
            }
        }
        Ok(())
    }
}

impl Fv2dSnapshot {
    /// Load the latest iteration stored in the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = open(path)?;
        let latest = file_iterations(&file)?.last().copied();
        Self::read(path, &file, latest)
    }

    pub fn load_iteration(path: impl AsRef<Path>, iteration: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = open(path)?;
        if !file_iterations(&file)?.contains(&iteration) {
            return Err(Error::MissingIteration {
                file: path.to_owned(),
                iteration,
            });
        }
        Self::read(path, &file, Some(iteration))
    }

    fn read(path: &Path, file: &File, iteration: Option<usize>) -> Result<Self> {
        let root = SnapshotReader::new(path, file)?;
        let x = root.read_flat("x")?;
        let y = root.read_flat("y")?;
        let fields = match iteration {
            Some(iteration) => {
                debug!("Reading iteration {} from {:?}", iteration, path);
                let group = file.group(&iteration_group_name(iteration))?;
                SnapshotReader::new(path, &group)?.read_fields()?
            }
            None => {
                debug!("Reading root snapshot from {:?}", path);
                root.read_fields()?
            }
        };
        Ok(Self {
            x,
            y,
            iteration,
            fields,
        })
    }

    /// Number of cells along x.
    pub fn nx(&self) -> usize {
        self.fields.rho.shape()[1]
    }

    pub fn ny(&self) -> usize {
        self.fields.rho.shape()[0]
    }

    /// The first row of the snapshot.
    pub fn profile(&self) -> Result<Fv2dProfile> {
        self.profile_row(0)
    }

    pub fn profile_row(&self, row: usize) -> Result<Fv2dProfile> {
        let nx = self.nx();
        if row >= self.ny() {
            return Err(Error::Shape(format!(
                "row {row} out of range for {} rows",
                self.ny()
            )));
        }
        if self.x.len() < nx {
            return Err(Error::Shape(format!(
                "{} x coordinates for {nx} cells",
                self.x.len()
            )));
        }
        Ok(Fv2dProfile {
            x: self.x.slice(s![..nx]).to_owned(),
            fields: self.fields.map(|field| field.row(row).to_owned()),
        })
    }
}

impl Profile for Fv2dProfile {
    fn coordinates(&self) -> &Array1<f64> {
        &self.x
    }

    fn fields(&self) -> &PrimitiveFields<Ix1> {
        &self.fields
    }
}
