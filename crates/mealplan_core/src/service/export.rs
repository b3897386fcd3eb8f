//! Line-oriented file sink for shopping lists.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes each line followed by `\n`, truncating an existing file.
pub fn write_lines(path: &Path, lines: &[String]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for line in lines {
        writeln!(writer, "{line}")?;
    }
    writer.flush()
}
