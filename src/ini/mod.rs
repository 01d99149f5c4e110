//! Reading and writing simulator input files. fv2d reads standard
//! INI files, Athena++ uses the same format with `<section>` headers.

mod assignment;
mod dialect;
mod document;
mod parameter_file;

pub use self::assignment::Assignment;
pub use self::assignment::OptionPath;
pub use self::dialect::Dialect;
pub use self::document::IniDocument;
pub use self::document::DEFAULT_SECTION;
pub use self::parameter_file::convert;
pub use self::parameter_file::ParameterFile;
