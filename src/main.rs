use lyricpick::app::TerminalSurface;
use lyricpick::batch::{BatchOptions, BatchProcessor};
use lyricpick::editor::{ExternalEditor, LyricsEditor};
use lyricpick::genre::LastFmGenre;
use lyricpick::library::LoftyStore;
use lyricpick::sources::{self, HttpClient};
use lyricpick::{audio, config};
use log::LevelFilter;
use std::io::stdout;
use std::path::PathBuf;

#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    play: bool,
    skip: bool,
    debug: bool,
    genre: bool,
    parallel: bool,
    editor: Option<String>,
    files: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1).collect())?;

    if args.debug {
        let mut builder = colog::default_builder();
        builder.filter(None, LevelFilter::Debug);
        builder.init();
    }

    let settings = config::load_settings()?;
    let client = HttpClient::new(settings.request_timeout(), &settings.user_agent);
    let editor = ExternalEditor::detect(args.editor.as_deref(), settings.editor.as_deref())
        .map(|editor| Box::new(editor) as Box<dyn LyricsEditor>);
    let options = BatchOptions {
        play: args.play,
        skip_existing: args.skip,
        genre: args.genre,
        parallel: args.parallel || settings.parallel_sources,
    };

    let mut processor = BatchProcessor::new(
        options,
        Box::new(LoftyStore),
        sources::default_sources(&client),
        Box::new(TerminalSurface::new()),
        audio::open_default(),
    )
    .with_editor(editor)
    .with_genre(Box::new(LastFmGenre::new(
        client.clone(),
        settings.lastfm_api_key.clone(),
    )));

    let mut out = stdout();
    processor.process(&args.files, &mut out)?;
    processor.print_reports(&mut out)?;
    Ok(())
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "-p" | "--play" => out.play = true,
            "-s" | "--skip" => out.skip = true,
            "-d" | "--debug" => out.debug = true,
            "-g" | "--genre" => out.genre = true,
            "-j" | "--parallel" => out.parallel = true,
            "-e" | "--editor" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--editor requires a command");
                };
                if value.trim().is_empty() {
                    anyhow::bail!("--editor cannot be empty");
                }
                out.editor = Some(value.trim().to_string());
            }
            other if other.starts_with("--editor=") => {
                let value = other.trim_start_matches("--editor=").trim();
                if value.is_empty() {
                    anyhow::bail!("--editor cannot be empty");
                }
                out.editor = Some(value.to_string());
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "--" => {
                out.files
                    .extend(args[index + 1..].iter().map(PathBuf::from));
                break;
            }
            other if other.starts_with('-') && other.len() > 1 => {
                anyhow::bail!("unknown argument {other}")
            }
            file => out.files.push(PathBuf::from(file)),
        }
        index += 1;
    }

    if out.files.is_empty() {
        anyhow::bail!("no files given\n\nUsage: lyricpick [options] <file>...");
    }
    Ok(out)
}

fn print_help() {
    println!("Usage: lyricpick [options] <file>...");
    println!();
    println!("Options:");
    println!("  -p --play           Play audio automatically while processing");
    println!("  -s --skip           Skip songs that already have lyrics");
    println!("  -d --debug          Log debug output to stderr");
    println!("  -g --genre          Look up the genre of each song instead of lyrics");
    println!("  -e --editor EDITOR  Editor used to edit lyrics");
    println!("  -j --parallel       Query lyrics sources concurrently");
    println!("  -h --help           Show this screen");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn parses_flags_and_files() {
        let parsed = parse_args(args(&["-p", "--skip", "-e", "nano", "a.mp3", "music"]))
            .expect("parse");
        assert_eq!(
            parsed,
            CliArgs {
                play: true,
                skip: true,
                editor: Some(String::from("nano")),
                files: vec![PathBuf::from("a.mp3"), PathBuf::from("music")],
                ..CliArgs::default()
            }
        );
    }

    #[test]
    fn accepts_inline_editor_and_double_dash() {
        let parsed = parse_args(args(&["--editor=vim", "-g", "--", "-odd.mp3"])).expect("parse");
        assert_eq!(parsed.editor.as_deref(), Some("vim"));
        assert!(parsed.genre);
        assert_eq!(parsed.files, vec![PathBuf::from("-odd.mp3")]);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(args(&["--bogus", "a.mp3"])).is_err());
        assert!(parse_args(args(&["a.mp3", "-e"])).is_err());
        assert!(parse_args(args(&["-d"])).is_err());
    }
}
