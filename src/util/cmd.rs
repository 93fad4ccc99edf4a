use crate::prelude::*;
use itertools::Itertools;
use nu_ansi_term::{Color, Style};
use std::iter;
use std::process::Stdio;
use tokio::process::Command;

/// Keeps ffmpeg quiet unless something goes wrong. Progress is reported
/// by our own logs instead.
const DEFAULT_FF_OPTIONS: &[&str] = &["-hide_banner", "-loglevel", "error"];

/// If the CLI display string length exceeds this value, then the command
/// will be printed using multiline format.
const LONG_CMD_THRESHOLD: usize = 100;

pub(crate) async fn ffmpeg(args: impl IntoIterator<Item = impl Into<String>>) -> Result<Vec<u8>> {
    let args = DEFAULT_FF_OPTIONS
        .iter()
        .copied()
        .map(ToOwned::to_owned)
        .chain(args.into_iter().map(Into::into));

    run_cmd("ffmpeg", args).await
}

async fn run_cmd(
    program: &str,
    args: impl IntoIterator<Item = impl Into<String>>,
) -> Result<Vec<u8>> {
    let args: Vec<_> = args.into_iter().map(Into::into).collect();

    let cli = render_cli(program, args.iter().map(String::as_str))?;
    debug!("{cli}");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("couldn't spawn `{program}`, make sure it's installed"))?
        .wait_with_output();

    let output = tokio::select! {
        ctrlc = tokio::signal::ctrl_c() => {
            ctrlc.context("couldn't Ctrl+C")?;
            bail!("Process was killed with Ctrl+C");
        }
        output = output => {
            output.context("couldn't run command")?
        }
    };

    if !output.status.success() {
        let status = output.status;
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();

        bail!("Process `{program}` failed with {status}\n{stderr}");
    }

    Ok(output.stdout)
}

fn render_cli<'a>(
    program: &'a str,
    args: impl IntoIterator<Item = &'a str>,
) -> Result<String> {
    let quote = |part: &'a str| {
        shlex::try_quote(part).with_context(|| format!("Can't quote the CLI argument {part:?}"))
    };

    let program = Color::Blue.paint(quote(program)?);

    let args: Vec<_> = args
        .into_iter()
        .map(|arg| {
            let arg = quote(arg)?;
            let style = if arg.starts_with('-') {
                Color::Blue.normal()
            } else {
                Style::new()
            };
            anyhow::Ok(style.paint(arg))
        })
        .collect::<Result<_>>()?;

    let parts = iter::once(program).chain(args);

    let compact = parts.clone().join(" ");
    if compact.len() <= LONG_CMD_THRESHOLD {
        return Ok(compact);
    }
    Ok(format!("(\n  {}\n)", { parts }.format(" \n    ")))
}
