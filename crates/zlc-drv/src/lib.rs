//! zlc-drv - Compiler driver.
//!
//! Orchestrates the pipeline:
//!
//! ```text
//! source text
//!      |
//!      v
//! [zlc-lex]  tokens
//!      |
//!      v
//! [zlc-par]  AST
//!      |
//!      v
//! [zlc-sem]  checked AST
//!      |
//!      v
//! [zlc-gen]  IFJcode24 text
//! ```
//!
//! Each stage halts the pipeline with a classified `CompileError`; the
//! driver maps the error kind to the process exit code and prints the
//! collected diagnostics on stderr. Generated code reaches stdout only
//! when the whole pipeline succeeded.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context};
use zlc_util::{Handler, Result};

/// Which artifact `Session::compile` renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitStage {
    /// Debug listing of the token stream.
    Tokens,

    /// Debug dump of the AST.
    Ast,

    /// IFJcode24 text (the default).
    Code,
}

/// Compiler configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input file; None reads standard input.
    pub input: Option<PathBuf>,

    /// Artifact to produce.
    pub emit: EmitStage,
}

impl Config {
    /// Builds a config from the positional command-line arguments
    /// (without the program name). At most one argument is accepted.
    pub fn from_args<I>(args: I) -> anyhow::Result<Config>
    where
        I: IntoIterator<Item = String>,
    {
        let positional: Vec<String> = args.into_iter().collect();
        if positional.len() > 1 {
            bail!("expected at most one input file, got {}", positional.len());
        }
        Ok(Config {
            input: positional.into_iter().next().map(PathBuf::from),
            emit: EmitStage::Code,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input: None,
            emit: EmitStage::Code,
        }
    }
}

/// One compiler invocation.
pub struct Session {
    pub config: Config,
    handler: Handler,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            handler: Handler::new(),
        }
    }

    /// Collected diagnostics.
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Reads the configured input file, or standard input.
    pub fn read_source(&self) -> anyhow::Result<String> {
        match &self.config.input {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read '{}'", path.display())),
            None => {
                let mut source = String::new();
                std::io::stdin()
                    .read_to_string(&mut source)
                    .context("failed to read standard input")?;
                Ok(source)
            },
        }
    }

    /// Runs the pipeline up to the configured stage.
    ///
    /// Errors are recorded in the session handler and returned.
    pub fn compile(&self, source: &str) -> Result<String> {
        let result = self.run_pipeline(source);
        if let Err(error) = &result {
            self.handler.report(error);
        }
        result
    }

    fn run_pipeline(&self, source: &str) -> Result<String> {
        if self.config.emit == EmitStage::Tokens {
            return render_tokens(source);
        }

        let program = zlc_par::parse(source)?;
        if self.config.emit == EmitStage::Ast {
            return Ok(format!("{:#?}\n", program));
        }

        zlc_sem::analyze(&program)?;
        zlc_gen::generate(&program)
    }
}

/// Convenience entry point: full pipeline over a source string.
pub fn compile_source(source: &str) -> Result<String> {
    let program = zlc_par::parse(source)?;
    zlc_sem::analyze(&program)?;
    zlc_gen::generate(&program)
}

/// Renders the token stream, one token per line.
fn render_tokens(source: &str) -> Result<String> {
    let mut lexer = zlc_lex::Lexer::new(source);
    let mut out = String::new();
    loop {
        let token = lexer.next_token()?;
        if token.is_eof() {
            break;
        }
        out.push_str(&format!("{:?}\n", token));
    }
    Ok(out)
}
