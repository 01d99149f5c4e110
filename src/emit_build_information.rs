use std::fs::File;
use std::path::Path;

use log::debug;
use serde::Serialize;

use crate::error::IoResultExt;
use crate::error::Result;

const BUILD_INFO_FILENAME: &str = "build_info.yml";

#[derive(Serialize)]
struct BuildInfo {
    version: &'static str,
    timestamp: &'static str,
    features: &'static str,
    opt_level: &'static str,
    target_triple: &'static str,

    commit_message: &'static str,
    commit_timestamp: &'static str,
    branch: &'static str,
    commit: &'static str,
}

/// Write version and git information of this build into `output_dir`.
pub fn emit_build_information(output_dir: &Path) -> Result<()> {
    let build_info = BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        timestamp: env!("VERGEN_BUILD_TIMESTAMP"),
        features: env!("VERGEN_CARGO_FEATURES"),
        opt_level: env!("VERGEN_CARGO_OPT_LEVEL"),
        target_triple: env!("VERGEN_CARGO_TARGET_TRIPLE"),
        commit_message: env!("VERGEN_GIT_COMMIT_MESSAGE"),
        commit_timestamp: env!("VERGEN_GIT_COMMIT_TIMESTAMP"),
        branch: env!("VERGEN_GIT_BRANCH"),
        commit: env!("VERGEN_GIT_SHA"),
    };
    let path = output_dir.join(BUILD_INFO_FILENAME);
    debug!("Writing build information to {:?}", path);
    serde_yaml::to_writer(File::create(&path).at_path(&path)?, &build_info)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::emit_build_information;

    #[test]
    fn build_information_is_yaml() {
        let dir = TempDir::new().unwrap();
        emit_build_information(dir.path()).unwrap();
        let contents = fs::read_to_string(dir.path().join("build_info.yml")).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&contents).unwrap();
        assert_eq!(
            value["version"].as_str(),
            Some(env!("CARGO_PKG_VERSION"))
        );
        assert!(value["commit"].is_string());
    }
}
