//! The command table and the commands themselves.
use std::io::Write;

use anyhow::{Context, Result};
use shm_segment::SharedSegment;

use crate::session::{Console, Session};

type Handler = fn(&mut Session, &[String], &mut Console<'_>) -> Result<()>;

pub struct CommandEntry {
    pub name: &'static str,
    pub run: Handler,
    /// Shown by `help`, entries without one are aliases.
    pub description: &'static str,
}

pub static COMMANDS: &[CommandEntry] = &[
    CommandEntry { name: "create", run: create, description: "Create shared memory." },
    CommandEntry { name: "open", run: open, description: "Open shared memory." },
    CommandEntry { name: "close", run: close, description: "Close shared memory." },
    CommandEntry { name: "read", run: read, description: "Read from shared memory." },
    CommandEntry { name: "write", run: write, description: "Write onto shared memory." },
    CommandEntry { name: "status", run: status, description: "Print the opened shared memory." },
    CommandEntry { name: "unlink", run: unlink, description: "Remove a shared memory name." },
    CommandEntry { name: "args", run: args, description: "Print arguments." },
    CommandEntry { name: "help", run: help, description: "Print help message." },
    CommandEntry { name: "quit", run: quit, description: "Quit application." },
    CommandEntry { name: "q", run: quit, description: "" },
];

fn create(session: &mut Session, args: &[String], console: &mut Console<'_>) -> Result<()> {
    let [_, name, size] = args else {
        return usage(console, "create name$ size#");
    };

    let size = parse_u32(size)?;
    session.segment.create(name, size)?;
    tracing::debug!(name = %name, size, "created");
    Ok(())
}

fn open(session: &mut Session, args: &[String], console: &mut Console<'_>) -> Result<()> {
    let [_, name, size] = args else {
        return usage(console, "open name$ size#");
    };

    let size = parse_u32(size)?;
    session.segment.open(name, size)?;
    tracing::debug!(name = %name, size, "opened");
    Ok(())
}

fn close(session: &mut Session, _: &[String], _: &mut Console<'_>) -> Result<()> {
    session.segment.close();
    tracing::debug!("closed");
    Ok(())
}

fn read(session: &mut Session, args: &[String], console: &mut Console<'_>) -> Result<()> {
    if !session.segment.is_opened() {
        writeln!(console.err, "Not opened.")?;
        return Ok(());
    }

    let [_, offset, length] = args else {
        return usage(console, "read offset# length#");
    };

    let offset = parse_u32(offset)?;
    let length = parse_u32(length)?;

    for i in 0..length {
        let byte = offset
            .checked_add(i)
            .and_then(|at| session.segment.read_byte(at));

        let Some(byte) = byte else {
            break;
        };

        write!(console.out, "{byte:02X} ")?;
    }

    writeln!(console.out)?;
    Ok(())
}

fn write(session: &mut Session, args: &[String], console: &mut Console<'_>) -> Result<()> {
    if !session.segment.is_opened() {
        writeln!(console.err, "Not opened.")?;
        return Ok(());
    }

    let [_, offset, data @ ..] = args else {
        return usage(console, "write offset# data1# [ data2# [ ... ] ]");
    };

    if data.is_empty() {
        return usage(console, "write offset# data1# [ data2# [ ... ] ]");
    }

    let offset = parse_u32(offset)?;
    // Reject the whole line before writing any of it.
    let data = data
        .iter()
        .map(|arg| parse_u8(arg))
        .collect::<Result<Vec<_>>>()?;

    for (i, byte) in (0u32..).zip(data) {
        let Some(at) = offset.checked_add(i) else {
            break;
        };

        session.segment.write_byte(at, byte);
    }

    Ok(())
}

fn status(session: &mut Session, _: &[String], console: &mut Console<'_>) -> Result<()> {
    match session.segment.name() {
        Some(name) => writeln!(console.out, "{name} ({} bytes)", session.segment.size())?,
        None => writeln!(console.out, "not opened")?,
    }

    Ok(())
}

fn unlink(_: &mut Session, args: &[String], console: &mut Console<'_>) -> Result<()> {
    let [_, name] = args else {
        return usage(console, "unlink name$");
    };

    SharedSegment::unlink(name)?;
    tracing::debug!(name = %name, "unlinked");
    Ok(())
}

fn args(_: &mut Session, args: &[String], console: &mut Console<'_>) -> Result<()> {
    for (no, arg) in args.iter().enumerate() {
        writeln!(console.out, "[{no}]{arg}")?;
    }

    Ok(())
}

fn help(_: &mut Session, _: &[String], console: &mut Console<'_>) -> Result<()> {
    for entry in COMMANDS.iter().filter(|entry| !entry.description.is_empty()) {
        writeln!(console.out, "{:>16} - {}", entry.name, entry.description)?;
    }

    Ok(())
}

fn quit(session: &mut Session, _: &[String], _: &mut Console<'_>) -> Result<()> {
    session.running = false;
    Ok(())
}

fn usage(console: &mut Console<'_>, line: &str) -> Result<()> {
    writeln!(console.out, "usage:")?;
    writeln!(console.out, "  {line}")?;
    Ok(())
}

/// Decimal, or hexadecimal with a `0x` prefix.
fn parse_u32(arg: &str) -> Result<u32> {
    let parsed = match arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => arg.parse(),
    };

    parsed.with_context(|| format!("invalid number `{arg}`"))
}

fn parse_u8(arg: &str) -> Result<u8> {
    let value = parse_u32(arg)?;
    u8::try_from(value).with_context(|| format!("byte value `{arg}` is out of range"))
}

#[cfg(test)]
mod tests {
    use super::{parse_u32, parse_u8};

    #[test]
    fn numbers() {
        assert_eq!(parse_u32("16").unwrap(), 16);
        assert_eq!(parse_u32("0x10").unwrap(), 16);
        assert_eq!(parse_u32("0XfF").unwrap(), 255);
        assert_eq!(parse_u32("4294967295").unwrap(), u32::MAX);

        assert!(parse_u32("").is_err());
        assert!(parse_u32("0x").is_err());
        assert!(parse_u32("-1").is_err());
        assert!(parse_u32("4294967296").is_err());
        assert!(parse_u32("ten").is_err());
    }

    #[test]
    fn bytes() {
        assert_eq!(parse_u8("0xAB").unwrap(), 0xAB);
        assert_eq!(parse_u8("255").unwrap(), 255);
        assert!(parse_u8("256").is_err());
    }
}
