use std::io::{self, Write};

use extract::Command;

pub const SUMMARY: &str = "Tutorial test";
pub const KILL_TIMEOUT: &str = "30m";

/// Every command line is nested under `execute: |` with this indent.
const INDENT: &str = "  ";

/// Render the task descriptor for `commands`.
///
/// The header is fixed; each line of each command follows, indented by two
/// spaces, with no separator between commands.
pub fn render(commands: &[Command]) -> String {
    let mut out = format!("summary: {SUMMARY}\n\nkill-timeout: {KILL_TIMEOUT}\n\nexecute: |\n");
    for line in commands.iter().flat_map(Command::lines) {
        out.push_str(INDENT);
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Write the rendered task descriptor to `out`.
pub fn write_to<W: Write>(out: &mut W, commands: &[Command]) -> io::Result<()> {
    out.write_all(render(commands).as_bytes())
}
