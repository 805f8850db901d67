mod commands;
mod session;
mod token;

use std::io;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use session::{Console, Session};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let ShellCommand {
        prompt,
        quiet,
        create,
        open,
    } = ShellCommand::parse();

    let (stdout, stderr) = (io::stdout(), io::stderr());
    let (mut out, mut err) = (stdout.lock(), stderr.lock());
    let mut console = Console {
        out: &mut out,
        err: &mut err,
    };

    let mut session = Session::new();

    let startup = match (create, open) {
        (Some(args), _) => Some(("create", args)),
        (_, Some(args)) => Some(("open", args)),
        (None, None) => None,
    };

    if let Some((verb, args)) = startup {
        let line: Vec<String> = std::iter::once(verb.to_owned()).chain(args).collect();
        session.execute(&line, &mut console)?;
    }

    let prompt = (!quiet).then_some(prompt.as_str());
    let result = session.run(&mut io::stdin().lock(), &mut console, prompt);

    // Release the mapping before reporting anything else.
    drop(session);
    result.context("session aborted")
}

#[derive(Parser)]
#[command(version, about = "Create, open, read and write named shared memory interactively")]
struct ShellCommand {
    /// The prompt printed before each command is read.
    #[arg(long, default_value = "> ")]
    prompt: String,

    /// Do not print prompts, useful when commands are piped in.
    #[arg(short, long)]
    quiet: bool,

    /// Create a segment before the first command.
    #[arg(long, num_args = 2, value_names = ["NAME", "SIZE"], conflicts_with = "open")]
    create: Option<Vec<String>>,

    /// Open an existing segment before the first command.
    #[arg(long, num_args = 2, value_names = ["NAME", "SIZE"])]
    open: Option<Vec<String>>,
}
