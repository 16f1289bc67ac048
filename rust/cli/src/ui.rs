//! Output helpers for consistent error and warning lines.

use std::io::Write;

pub fn write_error(err: &mut dyn Write, msg: &str) -> std::io::Result<()> {
    writeln!(err, "error: {}", msg)
}

pub fn write_warning(err: &mut dyn Write, msg: &str) -> std::io::Result<()> {
    writeln!(err, "warning: {}", msg)
}
