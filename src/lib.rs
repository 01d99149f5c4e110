pub mod campaign;
pub mod code;
pub mod command_line_options;
pub(crate) mod emit_build_information;
pub mod error;
pub mod ini;
pub mod io;
pub mod logging;
pub(crate) mod named;
pub mod parameters;
pub mod process;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::Error;
pub use error::Result;

pub mod prelude {
    pub use super::campaign::Campaign;
    pub use super::code::AthenaBuildOptions;
    pub use super::code::AthenaCode;
    pub use super::code::Fv2dBuildOptions;
    pub use super::code::Fv2dCode;
    pub use super::code::RunOptions;
    pub use super::code::Simulator;
    pub use super::error::Error;
    pub use super::error::Result;
    pub use super::ini::Dialect;
    pub use super::ini::ParameterFile;
    pub use super::io::AthenaTabular;
    pub use super::io::Fv2dSnapshot;
    pub use super::io::Profile;
    pub use super::named::*;
}
