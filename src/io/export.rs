use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use log::info;

use super::Profile;
use crate::error::IoResultExt;
use crate::error::Result;

/// Write a profile as whitespace separated columns, one row per
/// cell, with a `#` header naming the columns.
pub fn write_columns(profile: &dyn Profile, path: &Path) -> Result<()> {
    info!("Writing profile to {:?}", path);
    let file = File::create(path).at_path(path)?;
    let mut writer = BufWriter::new(file);
    write_profile(profile, &mut writer).at_path(path)?;
    writer.flush().at_path(path)
}

fn write_profile(profile: &dyn Profile, writer: &mut impl Write) -> std::io::Result<()> {
    let fields = profile.fields().named();
    let names: Vec<_> = std::iter::once("x")
        .chain(fields.iter().map(|(name, _)| *name))
        .collect();
    writeln!(writer, "# {}", names.join(" "))?;
    for (i, x) in profile.coordinates().iter().enumerate() {
        write!(writer, "{x:.8e}")?;
        for (_, field) in fields.iter() {
            write!(writer, " {:.8e}", field[i])?;
        }
        writeln!(writer)?;
    }
    Ok(())
}
