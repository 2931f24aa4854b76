use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use rlox::ast_printer::AstPrinter;
use rlox::error::LoxError;
use rlox::parser::ParserOptions;
use rlox::scanner::Scanner;
use rlox::Lox;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    /// Without a subcommand an interactive prompt is started
    #[command(subcommand)]
    commands: Option<Commands>,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,

    /// Reject `var` declarations that have no initializer
    #[arg(long, global = true)]
    require_initializer: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Emit the token list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parses a file and prints the syntax tree of every statement
    Parse { filename: PathBuf },

    /// Runs a file as a Lox program
    Run { filename: PathBuf },

    /// Starts an interactive prompt
    Repl,
}

/// Reads a whole file as UTF‑8 text.
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    String::from_utf8(buf).context(format!("File {:?} is not valid UTF-8", filename))
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // `[module:line] - message`, with the crate prefix stripped.
    Builder::new()
        .format(|buf, record| {
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("rlox::").unwrap_or(module);

            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn report(error: &LoxError) {
    match error {
        LoxError::Compile(errors) => {
            for e in errors {
                eprintln!("{}", e);
            }
        }
        LoxError::Runtime(e) => eprintln!("{}", e.report()),
        other => eprintln!("{}", other),
    }
}

fn tokenize(filename: &Path, json: bool) -> Result<()> {
    let source = read_file(filename)?;
    let mut tokens = Vec::new();
    let mut tokenized = true;

    for item in Scanner::new(&source) {
        match item {
            Ok(token) => tokens.push(token),
            Err(e) => {
                tokenized = false;
                eprintln!("{}", e);
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for token in &tokens {
            println!("{}", token);
        }
    }

    if !tokenized {
        debug!("Tokenization failed, exiting with code 65");
        process::exit(65);
    }

    Ok(())
}

fn parse(filename: &Path, options: ParserOptions) -> Result<()> {
    let source = read_file(filename)?;
    let (statements, diagnostics) = rlox::parse(&source, options);

    for e in diagnostics.errors() {
        eprintln!("{}", e);
    }

    for stmt in &statements {
        println!("{}", AstPrinter::print_stmt(stmt));
    }

    if diagnostics.had_error() {
        process::exit(65);
    }

    Ok(())
}

fn run(filename: &Path, options: ParserOptions) -> Result<()> {
    let source = read_file(filename)?;
    let mut lox = Lox::new().with_options(options);

    if let Err(e) = lox.run(&source) {
        debug!("Run failed: {}", e);
        report(&e);
        process::exit(e.exit_code());
    }

    info!("Program executed successfully");
    Ok(())
}

/// One prompt entry.  A line ending in `{` keeps reading until a line
/// ending in `}`.
fn read_entry(editor: &mut DefaultEditor) -> rustyline::Result<String> {
    let mut source = editor.readline("rlox> ")?;

    if source.trim_end().ends_with('{') {
        loop {
            let line = editor.readline("....> ")?;
            source.push('\n');
            source.push_str(&line);

            if line.trim_end().ends_with('}') {
                break;
            }
        }
    }

    Ok(source)
}

fn repl(options: ParserOptions) -> Result<()> {
    let mut editor = DefaultEditor::new().context("Failed to start line editor")?;
    let mut lox = Lox::new().with_options(options);

    loop {
        match read_entry(&mut editor) {
            Ok(source) => {
                editor.add_history_entry(source.as_str())?;

                // Errors end only this entry; the session keeps its globals.
                if let Err(e) = lox.run(&source) {
                    report(&e);
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        Builder::new().filter_level(log::LevelFilter::Off).init();
    }

    info!("CLI arguments: {:?}", args);

    let options = ParserOptions {
        require_initializer: args.require_initializer,
    };

    match args.commands {
        Some(Commands::Tokenize { filename, json }) => tokenize(&filename, json),
        Some(Commands::Parse { filename }) => parse(&filename, options),
        Some(Commands::Run { filename }) => run(&filename, options),
        Some(Commands::Repl) | None => repl(options),
    }
}
