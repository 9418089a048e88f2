use std::io::Write;

use crate::domain::Version;
use crate::error::Result;

/// Writes the version list as a JSON array followed by a newline.
///
/// An empty list is written as `[]`, never `null`.
pub fn write_versions<W: Write>(mut writer: W, versions: &[Version]) -> Result<()> {
    serde_json::to_writer(&mut writer, versions)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
