//! Zombie detection through procfs.
//!
//! `/proc/<pid>/stat` looks like `1234 (my prog) Z 1 ...`. The command name
//! may contain spaces and parentheses, so the state is the first field after
//! the *last* `)`.

use std::io;

/// Read the one-letter scheduler state of `pid`.
///
/// Returns `Ok(None)` when the process vanished before its stat file could
/// be read.
pub fn read_state(pid: u32) -> io::Result<Option<char>> {
    let content = match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    parse_state(&content).map(Some).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("malformed /proc/{pid}/stat"),
        )
    })
}

/// Extract the state field from the content of a stat file.
pub fn parse_state(stat: &str) -> Option<char> {
    let (_, rest) = stat.rsplit_once(')')?;
    rest.trim_start().chars().next()
}

/// `Z` is a zombie; `X` (and the old `x`) a task that is already dead.
pub fn is_exited_state(state: char) -> bool {
    matches!(state, 'Z' | 'X' | 'x')
}
