// Chromatone analyzer: CLI entry point.
//
// Reads a MIDI file, decodes a key per bar, tracks chords, and prints the
// result as text or JSON.
//
// Usage:
//   cargo run -p chromatone_cli -- <input.mid> [--config FILE] [--json]
//
// The config file is JSON with optional "keys" and "chords" sections; any
// field left out keeps its default. Set RUST_LOG=debug for pipeline details.

use std::path::Path;

use chromatone_cli::{AnalysisConfig, CliError, analyze_song, read_midi, render_text};

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run(&args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), CliError> {
    let input = args
        .get(1)
        .filter(|s| !s.starts_with("--"))
        .ok_or_else(|| {
            CliError::Usage("usage: analyze <input.mid> [--config FILE] [--json]".to_string())
        })?;
    let config = match parse_flag::<String>(args, "--config") {
        Some(path) => AnalysisConfig::load(Path::new(&path))?,
        None => AnalysisConfig::default(),
    };
    let json = args.iter().any(|a| a == "--json");

    let song = read_midi(Path::new(input))?;
    let analysis = analyze_song(&song, &config);
    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print!("{}", render_text(&analysis));
    }
    Ok(())
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
