mod output;
mod parameter_file_contents;

pub use self::output::HandleExistingOutput;
pub use self::output::OutputParameters;
pub use self::parameter_file_contents::Override;
pub use self::parameter_file_contents::ParameterFileContents;
