use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use atty::Stream;
use clap::{Parser, Subcommand};
use hitgloss_rs::{HitglossError, RenderConfig, SpanRenderer};
use serde_json::{Value, json};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "hitgloss-rs",
    about = "Render corpus search hits as annotated markup",
    version
)]
pub struct Cli {
    /// Emit JSON instead of one rendered line per hit.
    #[arg(long, global = true)]
    json: bool,

    /// JSON file with rendering settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Token list name in `_source` and in inner-hit match fragments.
    #[arg(long, global = true)]
    token_field: Option<String>,

    /// Marker the highlighter puts before a match.
    #[arg(long, global = true)]
    open_marker: Option<String>,

    /// Marker the highlighter puts after a match.
    #[arg(long, global = true)]
    close_marker: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render search responses or single hits.
    #[command(subcommand)]
    Render(RenderCommand),
}

#[derive(Subcommand, Debug)]
enum RenderCommand {
    /// Render every hit of a sentence search response.
    Sentences {
        /// Response file; reads stdin when omitted.
        input: Option<PathBuf>,
    },
    /// Render every hit of a word search response.
    Words {
        /// Response file; reads stdin when omitted.
        input: Option<PathBuf>,
    },
    /// Render a single sentence hit document.
    Sentence {
        /// Hit file; reads stdin when omitted.
        input: Option<PathBuf>,
        /// Sentence number used in token identifiers.
        #[arg(long, default_value_t = 0)]
        seq: usize,
    },
}

pub fn run() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let renderer = SpanRenderer::new(&config);
    match &cli.command {
        Command::Render(RenderCommand::Sentences { input }) => {
            handle_sentences(&renderer, input.as_deref(), cli.json)
        }
        Command::Render(RenderCommand::Words { input }) => {
            handle_words(&renderer, input.as_deref(), cli.json)
        }
        Command::Render(RenderCommand::Sentence { input, seq }) => {
            handle_sentence(&renderer, input.as_deref(), *seq, cli.json)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<RenderConfig, HitglossError> {
    let mut config = match &cli.config {
        Some(path) => RenderConfig::from_path(path)?,
        None => RenderConfig::default(),
    };
    if let Some(field) = &cli.token_field {
        config.token_field = field.clone();
    }
    if let Some(marker) = &cli.open_marker {
        config.open_marker = marker.clone();
    }
    if let Some(marker) = &cli.close_marker {
        config.close_marker = marker.clone();
    }
    debug!(?config, "render configuration");
    Ok(config)
}

fn read_document(input: Option<&Path>) -> Result<Value, HitglossError> {
    let raw = match input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            if atty::is(Stream::Stdin) {
                return Err(HitglossError::MissingInput);
            }
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    Ok(serde_json::from_str(&raw)?)
}

fn handle_sentences(
    renderer: &SpanRenderer<'_>,
    input: Option<&Path>,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let response = read_document(input)?;
    let page = renderer.render_sentence_page(&response);
    if as_json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }
    match &page.contexts {
        None => println!("{}", page.message),
        Some(contexts) => {
            println!(
                "{} sentences ({} with word matches)",
                page.n_sentences,
                page.matched_sentences()
            );
            for context in contexts {
                println!("{}", context.markup);
            }
        }
    }
    Ok(())
}

fn handle_words(
    renderer: &SpanRenderer<'_>,
    input: Option<&Path>,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let response = read_document(input)?;
    let page = renderer.render_word_page(&response);
    if as_json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }
    match &page.words {
        None => println!("{}", page.message),
        Some(rows) => {
            println!("{} occurrences", page.n_occurrences);
            for row in rows {
                println!("{row}");
            }
        }
    }
    Ok(())
}

fn handle_sentence(
    renderer: &SpanRenderer<'_>,
    input: Option<&Path>,
    seq: usize,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let hit = read_document(input)?;
    let rendered = renderer.render_hit(&hit, seq);
    if as_json {
        let payload = json!({
            "markup": rendered.markup,
            "matched_words": rendered.matches.to_class_names(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{}", rendered.markup);
    }
    Ok(())
}
