use anyhow::{Context, Result};
use std::path::PathBuf;

use spectroclip::{Settings, server, test_audio_gen};

const USAGE: &str = "\
Usage:
  spectroclip [--config <path>] [--port <n>]   serve the viewer
  spectroclip gen-test-audio [dir]             write test WAV files (default: .)";

enum Command {
    Serve { config: PathBuf, port: Option<u16> },
    GenTestAudio { dir: PathBuf },
    Help,
}

fn parse_args(args: &[String]) -> Result<Command> {
    if args.first().map(String::as_str) == Some("gen-test-audio") {
        let dir = args.get(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
        return Ok(Command::GenTestAudio { dir });
    }

    let mut config = PathBuf::from(Settings::FILE_NAME);
    let mut port = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                config = iter.next().map(PathBuf::from).context("--config needs a path")?;
            }
            "--port" => {
                let value = iter.next().context("--port needs a number")?;
                port = Some(value.parse().with_context(|| format!("Invalid port: {}", value))?);
            }
            "-h" | "--help" => return Ok(Command::Help),
            other => anyhow::bail!("Unknown argument: {}\n\n{}", other, USAGE),
        }
    }
    Ok(Command::Serve { config, port })
}

fn main() -> Result<()> {
    // Initialize logger - set RUST_LOG=debug for verbose output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match parse_args(&args)? {
        Command::Help => println!("{}", USAGE),
        Command::GenTestAudio { dir } => {
            let written = test_audio_gen::generate_all(&dir)?;
            log::info!("Generated {} test files in {}", written.len(), dir.display());
        }
        Command::Serve { config, port } => {
            let mut settings = Settings::load_or_create(&config);
            if let Some(port) = port {
                settings.port = port;
            }
            log::info!("spectroclip starting up");
            server::serve(&settings)?;
        }
    }
    Ok(())
}
