use linked_hash_map::LinkedHashMap;
use ndarray::Array;
use ndarray::Dimension;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq)]
pub struct MagneticField<D: Dimension> {
    pub bx: Array<f64, D>,
    pub by: Array<f64, D>,
    pub bz: Array<f64, D>,
}

/// The primitive variables written by both codes. Hydro-only runs
/// have no magnetic field, the divergence of B is only written by
/// some fv2d versions.
#[derive(Clone, Debug, PartialEq)]
pub struct PrimitiveFields<D: Dimension> {
    pub rho: Array<f64, D>,
    pub p: Array<f64, D>,
    pub u: Array<f64, D>,
    pub v: Array<f64, D>,
    pub w: Array<f64, D>,
    pub magnetic: Option<MagneticField<D>>,
    pub div_b: Option<Array<f64, D>>,
}

impl<D: Dimension> PrimitiveFields<D> {
    /// All present fields with their names, in output order.
    pub fn named(&self) -> Vec<(&'static str, &Array<f64, D>)> {
        let mut fields = vec![
            ("rho", &self.rho),
            ("p", &self.p),
            ("u", &self.u),
            ("v", &self.v),
            ("w", &self.w),
        ];
        if let Some(ref magnetic) = self.magnetic {
            fields.extend([("bx", &magnetic.bx), ("by", &magnetic.by), ("bz", &magnetic.bz)]);
        }
        if let Some(ref div_b) = self.div_b {
            fields.push(("div_b", div_b));
        }
        fields
    }

    /// Apply `f` to every field.
    pub fn map<E: Dimension>(&self, f: impl Fn(&Array<f64, D>) -> Array<f64, E>) -> PrimitiveFields<E> {
        PrimitiveFields {
            rho: f(&self.rho),
            p: f(&self.p),
            u: f(&self.u),
            v: f(&self.v),
            w: f(&self.w),
            magnetic: self.magnetic.as_ref().map(|magnetic| MagneticField {
                bx: f(&magnetic.bx),
                by: f(&magnetic.by),
                bz: f(&magnetic.bz),
            }),
            div_b: self.div_b.as_ref().map(&f),
        }
    }

    pub fn summary(&self) -> LinkedHashMap<String, FieldSummary> {
        self.named()
            .into_iter()
            .map(|(name, field)| (name.to_owned(), FieldSummary::new(field)))
            .collect()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct FieldSummary {
    pub shape: Vec<usize>,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl FieldSummary {
    pub fn new<D: Dimension>(field: &Array<f64, D>) -> Self {
        Self {
            shape: field.shape().to_vec(),
            min: field.iter().copied().fold(f64::INFINITY, f64::min),
            max: field.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean: field.mean().unwrap_or(f64::NAN),
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use ndarray::Array1;

    use super::FieldSummary;
    use super::MagneticField;
    use super::PrimitiveFields;

    fn fields(magnetic: bool) -> PrimitiveFields<ndarray::Ix1> {
        let ones = || Array1::ones(3);
        PrimitiveFields {
            rho: array![1.0, 0.5, 0.125],
            p: ones(),
            u: ones(),
            v: ones(),
            w: ones(),
            magnetic: magnetic.then(|| MagneticField {
                bx: ones(),
                by: ones(),
                bz: ones(),
            }),
            div_b: None,
        }
    }

    #[test]
    fn named_fields_include_magnetic_field_if_present() {
        let names = |f: &PrimitiveFields<ndarray::Ix1>| f.named().iter().map(|(n, _)| *n).collect::<Vec<_>>();
        assert_eq!(names(&fields(false)), vec!["rho", "p", "u", "v", "w"]);
        assert_eq!(
            names(&fields(true)),
            vec!["rho", "p", "u", "v", "w", "bx", "by", "bz"]
        );
    }

    #[test]
    fn summary_statistics() {
        let summary = FieldSummary::new(&array![1.0, 0.5, 0.125, 2.5]);
        assert_eq!(summary.shape, vec![4]);
        assert_eq!(summary.min, 0.125);
        assert_eq!(summary.max, 2.5);
        assert_eq!(summary.mean, 1.03125);
    }

    #[test]
    fn map_keeps_optional_fields() {
        let doubled = fields(true).map(|field| field * 2.0);
        assert_eq!(doubled.rho, array![2.0, 1.0, 0.25]);
        assert_eq!(doubled.magnetic.unwrap().bz, Array1::from_elem(3, 2.0));
        assert!(doubled.div_b.is_none());
    }
}
