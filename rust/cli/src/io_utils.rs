//! Small input helpers shared by the interactive provider.

use std::io::BufRead;

/// Reads a line from a buffered reader, blocking until available. Trims
/// whitespace; returns `None` on EOF or a read error.
pub fn read_line(reader: &mut dyn BufRead) -> Option<String> {
    let mut line = String::new();
    match reader.read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => Some(line.trim().to_string()),
        Err(_) => None,
    }
}
