//! Inkwell CLI: generate text for a writing project from the terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inkwell_api::OpenAiCompatProvider;
use inkwell_config::{CliOverrides, InkwellConfig};
use inkwell_core::Generator;
use inkwell_types::{available_models, default_model};
use std::io::{self, Read, Write};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "inkwell", version, about = "AI text generation for writers")]
struct Cli {
    /// Enable verbose/debug logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate text from a prompt
    Generate {
        /// Prompt text; read from stdin when omitted
        prompt: Option<String>,

        /// Model to use
        #[arg(long)]
        model: Option<String>,

        /// Sampling temperature (0 to 2)
        #[arg(long)]
        temperature: Option<f32>,

        /// Maximum tokens in the response
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Print text as it arrives
        #[arg(long)]
        stream: bool,

        /// API key (overrides INKWELL_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
    },
    /// List the models offered for selection
    Models,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Models => {
            print_models();
            Ok(())
        }
        Command::Generate {
            prompt,
            model,
            temperature,
            max_tokens,
            stream,
            api_key,
        } => {
            let config = InkwellConfig::load(CliOverrides {
                api_key,
                model,
                temperature,
                max_tokens,
                stream: stream.then_some(true),
            });
            let prompt = match prompt {
                Some(p) => p,
                None => read_stdin().context("Failed to read prompt from stdin")?,
            };
            generate(&config, prompt).await
        }
    }
}

fn print_models() {
    let default = default_model();
    for model in available_models() {
        let marker = if model.id == default.as_str() { "*" } else { " " };
        println!("{marker} {:<34} {}", model.id, model.display_name);
    }
}

fn read_stdin() -> io::Result<String> {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

async fn generate(config: &InkwellConfig, prompt: String) -> Result<()> {
    tracing::debug!(
        "Using {} at {} (config dir: {})",
        config.model,
        config.endpoint_url,
        config.config_dir.display()
    );
    let provider = OpenAiCompatProvider::new(&config.endpoint_url, config.wire.clone())
        .context("Failed to create API client")?;
    let generator = Generator::new(Arc::new(provider), Arc::new(config.secret_resolver()))
        .with_wire_format(config.wire.clone());

    let mut output = TailWriter::new(io::stdout());
    let text = generator
        .generate_with_progress(prompt, config.generation_options(), |text| {
            output.update(text)
        })
        .await?;
    output.finish(&text).context("Failed to write output")
}

/// Prints a growing text by writing only what each update appends.
///
/// The first write error stops further output and is reported by `finish`.
struct TailWriter<W: Write> {
    out: W,
    printed: usize,
    error: Option<io::Error>,
}

impl<W: Write> TailWriter<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            printed: 0,
            error: None,
        }
    }

    fn update(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        let tail = text.get(self.printed..).unwrap_or(text);
        match self
            .out
            .write_all(tail.as_bytes())
            .and_then(|()| self.out.flush())
        {
            Ok(()) => self.printed = text.len(),
            Err(e) => {
                tracing::warn!("Stopped printing output: {e}");
                self.error = Some(e);
            }
        }
    }

    /// Print the final text if nothing was streamed, then end the line.
    fn finish(mut self, text: &str) -> io::Result<()> {
        if self.printed == 0 {
            self.update(text);
        }
        if let Some(e) = self.error {
            return Err(e);
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_generate_flags() {
        let cli = Cli::parse_from([
            "inkwell",
            "generate",
            "--stream",
            "--model",
            "gemini-2.5-flash-preview-04-17",
            "--temperature",
            "1.1",
            "Write a sonnet",
        ]);
        match cli.command {
            Command::Generate {
                prompt,
                model,
                temperature,
                stream,
                max_tokens,
                api_key,
            } => {
                assert_eq!(prompt.as_deref(), Some("Write a sonnet"));
                assert_eq!(model.as_deref(), Some("gemini-2.5-flash-preview-04-17"));
                assert_eq!(temperature, Some(1.1));
                assert!(stream);
                assert!(max_tokens.is_none());
                assert!(api_key.is_none());
            }
            Command::Models => panic!("expected generate"),
        }
    }

    /// Accepts `limit` bytes, then fails every write.
    struct FailingSink {
        written: Vec<u8>,
        limit: usize,
        attempts: usize,
    }

    impl Write for FailingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.attempts += 1;
            if self.written.len() + buf.len() > self.limit {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn tail_writer_prints_only_new_text() {
        let mut out = TailWriter::new(Vec::new());
        out.update("Dear");
        out.update("Dear reader");
        out.update("Dear reader,");
        let TailWriter { out: buf, .. } = out;
        assert_eq!(buf, b"Dear reader,");
    }

    #[test]
    fn tail_writer_prints_buffered_result_once() {
        let mut buf = Vec::new();
        TailWriter::new(&mut buf).finish("Hello").unwrap();
        assert_eq!(buf, b"Hello\n");

        let mut buf = Vec::new();
        let mut out = TailWriter::new(&mut buf);
        out.update("Hi");
        out.finish("Hi").unwrap();
        assert_eq!(buf, b"Hi\n");
    }

    #[test]
    fn tail_writer_reports_first_write_error() {
        let mut sink = FailingSink {
            written: Vec::new(),
            limit: 4,
            attempts: 0,
        };
        let mut out = TailWriter::new(&mut sink);
        out.update("Dear");
        out.update("Dear reader");
        out.update("Dear reader,");
        let err = out.finish("Dear reader,").unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(sink.written, b"Dear");
        // No writes are attempted after the first failure
        assert_eq!(sink.attempts, 2);
    }

    #[test]
    fn parse_models_with_global_verbose() {
        let cli = Cli::parse_from(["inkwell", "models", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Models));
    }
}
