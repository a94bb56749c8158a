//! Command line encoding
//!
//! The command line property holds an array of little-endian `u32`
//! followed by NUL-terminated strings:
//!
//! ```text
//! [argc][offset argv0][offset argv1]...<workingdir>\0<argv0>\0<argv1>\0...
//! ```
//!
//! Offsets count from the start of the buffer. The working directory has no
//! offset entry and Firefox ignores it, but it has to be there.
//! Arguments are not escaped: an embedded NUL truncates that argument on
//! the receiving side.

/// Program name sent as argv[0], whatever program the window advertised
pub const COMMAND_PROGRAM: &str = "firefox";

/// Full argv for a remote invocation with the given pass-through arguments
pub fn command_argv(extra_args: &[String]) -> Vec<String> {
    let mut argv = Vec::with_capacity(extra_args.len() + 1);
    argv.push(COMMAND_PROGRAM.to_string());
    argv.extend_from_slice(extra_args);
    argv
}

/// Encode `argv` with `working_dir` in the command line property layout
pub fn encode<S: AsRef<str>>(working_dir: &str, argv: &[S]) -> Vec<u8> {
    let header_len = (argv.len() + 1) * 4;

    let mut strings = Vec::new();
    push_str(&mut strings, working_dir);

    let mut header = Vec::with_capacity(argv.len() + 1);
    header.push(argv.len() as u32);
    for arg in argv {
        header.push((header_len + strings.len()) as u32);
        push_str(&mut strings, arg.as_ref());
    }

    let mut buf = Vec::with_capacity(header_len + strings.len());
    for value in header {
        buf.extend_from_slice(&value.to_le_bytes());
    }
    buf.extend_from_slice(&strings);
    buf
}

fn push_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
}
