use std::io::{self, BufRead, Write};

use shm_segment::SharedSegment;

use crate::commands::COMMANDS;
use crate::token;

/// Where commands print to: regular output and diagnostics.
pub struct Console<'a> {
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
}

/// The state of one interactive session: the segment all commands act on.
pub struct Session {
    pub(crate) segment: SharedSegment,
    pub(crate) running: bool,
}

impl Session {
    pub fn new() -> Self {
        Session {
            segment: SharedSegment::new(),
            running: true,
        }
    }

    /// Read and execute lines until `quit` or the end of input.
    ///
    /// Only failing to read input or to print ends the session early, command errors are
    /// reported on the diagnostic stream.
    pub fn run(
        &mut self,
        input: &mut dyn BufRead,
        console: &mut Console<'_>,
        prompt: Option<&str>,
    ) -> io::Result<()> {
        let mut buffer = Vec::new();

        while self.running {
            if let Some(prompt) = prompt {
                write!(console.out, "{prompt}")?;
                console.out.flush()?;
            }

            buffer.clear();
            if input.read_until(b'\n', &mut buffer)? == 0 {
                tracing::debug!("end of input");
                break;
            }

            // Any bytes make a line, invalid UTF-8 is replaced rather than ending the session.
            let line = String::from_utf8_lossy(&buffer);
            let line = line.strip_suffix('\n').unwrap_or(&line);
            let line = line.strip_suffix('\r').unwrap_or(line);

            let args = token::split(line);
            self.execute(&args, console)?;
        }

        Ok(())
    }

    /// Look up the first token as a command and run it with all tokens.
    pub fn execute(&mut self, args: &[String], console: &mut Console<'_>) -> io::Result<()> {
        let Some(verb) = args.first() else {
            return Ok(());
        };

        let Some(entry) = COMMANDS.iter().find(|entry| entry.name == verb.as_str()) else {
            tracing::debug!(command = %verb, "unknown command");
            return writeln!(console.err, "Unknown command : {verb}");
        };

        tracing::debug!(command = entry.name, args = ?&args[1..], "dispatch");
        if let Err(err) = (entry.run)(self, args, console) {
            tracing::debug!(command = entry.name, "command failed: {err:#}");
            writeln!(console.err, "{err:#}")?;
        }

        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}
