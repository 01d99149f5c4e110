use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use log::debug;
use log::info;

use super::Dialect;
use super::IniDocument;
use crate::error::Error;
use crate::error::IoResultExt;
use crate::error::Result;

/// A simulator input file: a key/value document together with the
/// file it was read from and the dialect it is written in.
#[derive(Clone, Debug)]
pub struct ParameterFile {
    path: PathBuf,
    dialect: Dialect,
    document: IniDocument,
}

impl ParameterFile {
    pub fn open(path: impl AsRef<Path>, dialect: Dialect) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_owned()));
        }
        let contents = fs::read_to_string(path).at_path(path)?;
        debug!("Reading {} input file {:?}", dialect, path);
        Self::from_contents(path, dialect, &contents)
    }

    /// Open the file, deciding the dialect from its name.
    pub fn open_inferred(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::open(path, Dialect::infer(path))
    }

    pub fn from_contents(path: impl Into<PathBuf>, dialect: Dialect, contents: &str) -> Result<Self> {
        Ok(Self {
            path: path.into(),
            dialect,
            document: IniDocument::parse(&dialect.to_standard(contents))?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn document(&self) -> &IniDocument {
        &self.document
    }

    pub fn get(&self, section: &str, field: &str) -> Result<&str> {
        self.document.get(section, field)
    }

    pub fn set_param(&mut self, section: &str, field: &str, value: impl Display) -> Result<()> {
        debug!("Setting {section}/{field} = {value}");
        self.document.set(section, field, value)
    }

    /// The text of the file in its own dialect.
    pub fn contents(&self) -> String {
        self.dialect.render(&self.document.to_string())
    }

    /// Where `write` puts the file if no destination is given: the
    /// current directory, under the name of the file it was read from.
    pub fn default_destination(&self) -> Result<PathBuf> {
        self.path
            .file_name()
            .map(PathBuf::from)
            .ok_or_else(|| Error::FileNotFound(self.path.clone()))
    }

    pub fn write(&self, destination: Option<&Path>) -> Result<PathBuf> {
        let destination = match destination {
            Some(destination) => destination.to_owned(),
            None => self.default_destination()?,
        };
        info!("Writing {} input file {:?}", self.dialect, destination);
        fs::write(&destination, self.contents()).at_path(&destination)?;
        Ok(destination)
    }

    /// The name of the Athena problem generator this input was made for.
    /// It is taken from the `configure` line of the `comment` section,
    /// e.g. `configure = --prob=shock_tube` gives `shock_tube`.
    pub fn problem(&self) -> Result<String> {
        if self.dialect != Dialect::Athena {
            return Err(Error::NotAthenaFormat(self.path.clone()));
        }
        let configure = self.document.get("comment", "configure")?;
        Ok(configure
            .rsplit('=')
            .next()
            .unwrap_or(configure)
            .trim()
            .to_owned())
    }

    /// The same parameters, translated into another dialect.
    pub fn with_dialect(self, dialect: Dialect) -> Self {
        Self { dialect, ..self }
    }
}

/// Translate a configuration file from one dialect into another.
pub fn convert(input: &Path, output: &Path, from: Dialect, to: Dialect) -> Result<()> {
    info!("Converting {:?} ({}) to {:?} ({})", input, from, output, to);
    ParameterFile::open(input, from)?
        .with_dialect(to)
        .write(Some(output))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use super::convert;
    use super::ParameterFile;
    use crate::error::Error;
    use crate::ini::Dialect;
    use crate::test_utils::BRIO_WU_ATHINPUT;

    #[test]
    fn missing_file() {
        assert!(matches!(
            ParameterFile::open("does/not/exist.ini", Dialect::Standard),
            Err(Error::FileNotFound(_))
        ));
    }

    #[test]
    fn athena_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("athinput.bw");
        fs::write(&path, BRIO_WU_ATHINPUT).unwrap();
        let mut file = ParameterFile::open_inferred(&path).unwrap();
        assert_eq!(file.dialect(), Dialect::Athena);
        assert_eq!(file.get("mesh", "nx1").unwrap(), "800");
        file.set_param("mesh", "nx1", 1600).unwrap();
        file.set_param("time", "tlim", 0.1).unwrap();
        let destination = dir.path().join("athinput.bw_high_res");
        file.write(Some(&destination)).unwrap();
        let written = fs::read_to_string(&destination).unwrap();
        assert!(written.starts_with("<comment>\n"));
        assert!(written.contains("<mesh>\n"));
        assert!(written.contains("nx1 = 1600\n"));
        assert!(!written.contains('['));
        let reread = ParameterFile::open(&destination, Dialect::Athena).unwrap();
        assert_eq!(reread.get("time", "tlim").unwrap(), "0.1");
    }

    #[test]
    fn athena_problem_name() {
        let file = ParameterFile::from_contents("athinput.bw", Dialect::Athena, BRIO_WU_ATHINPUT)
            .unwrap();
        assert_eq!(file.problem().unwrap(), "shock_tube");
    }

    #[test]
    fn problem_requires_athena_dialect() {
        let file =
            ParameterFile::from_contents("setup.ini", Dialect::Standard, "[comment]\nconfigure = --prob=x\n")
                .unwrap();
        assert!(matches!(file.problem(), Err(Error::NotAthenaFormat(_))));
    }

    #[test]
    fn convert_between_dialects() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("athinput.bw");
        let output = dir.path().join("bw.ini");
        fs::write(&input, BRIO_WU_ATHINPUT).unwrap();
        convert(&input, &output, Dialect::Athena, Dialect::Standard).unwrap();
        let standard = fs::read_to_string(&output).unwrap();
        assert!(standard.contains("[mesh]\n"));
        let back = dir.path().join("athinput.back");
        convert(&output, &back, Dialect::Standard, Dialect::Athena).unwrap();
        let athena = ParameterFile::open(&back, Dialect::Athena).unwrap();
        let original = ParameterFile::open(&input, Dialect::Athena).unwrap();
        assert_eq!(athena.document(), original.document());
    }

    #[test]
    fn write_without_destination_uses_file_name() {
        let dir = TempDir::new().unwrap();
        let file = ParameterFile::from_contents(
            Path::new("some/dir/brio_wu.ini"),
            Dialect::Standard,
            "[run]\ntend = 1\n",
        )
        .unwrap();
        let name = file.default_destination().unwrap();
        assert_eq!(name, Path::new("brio_wu.ini"));
        let written = file.write(Some(&dir.path().join(&name))).unwrap();
        assert_eq!(
            fs::read_to_string(&written).unwrap(),
            "[run]\ntend = 1\n\n"
        );
        let nameless = ParameterFile::from_contents(Path::new("/"), Dialect::Standard, "").unwrap();
        assert!(matches!(
            nameless.default_destination(),
            Err(Error::FileNotFound(_))
        ));
    }
}
