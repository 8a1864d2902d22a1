use std::{env, fs::read_to_string, path::PathBuf, process::ExitCode, time::Instant};

use chespel::{display_error, parse_source, write_output, Stage};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_OUTPUT: &str = "generated_eval.cpp";

const USAGE: &str = "Usage: chespel [-help] [-nocomp] [-o <out>] [-ast <file>] <input>

Options:
    -help        Show this message
    -nocomp      Check the program without generating code
    -o <out>     Output file (default: generated_eval.cpp, `.cpp` is appended if missing)
    -ast <file>  Write the parsed tree to <file>";

#[derive(Debug, PartialEq)]
struct Options {
    input: Option<String>,
    output: PathBuf,
    ast_file: Option<PathBuf>,
    no_compile: bool,
    help: bool,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        input: None,
        output: PathBuf::from(DEFAULT_OUTPUT),
        ast_file: None,
        no_compile: false,
        help: false,
    };

    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-help" => options.help = true,
            "-nocomp" => options.no_compile = true,
            "-o" => {
                let output = args.next().ok_or("-o expects a file name")?;
                options.output = if output.ends_with(".cpp") {
                    PathBuf::from(output)
                } else {
                    PathBuf::from(format!("{}.cpp", output))
                };
            }
            "-ast" => {
                let file = args.next().ok_or("-ast expects a file name")?;
                options.ast_file = Some(PathBuf::from(file));
            }
            flag if flag.starts_with('-') => return Err(format!("Unknown option {}", flag)),
            input => {
                if options.input.is_some() {
                    return Err(String::from("Only one input file can be compiled at a time"));
                }
                options.input = Some(String::from(input));
            }
        }
    }

    Ok(options)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}\n\n{}", message, USAGE);
            return ExitCode::FAILURE;
        }
    };

    if options.help {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    let input = match &options.input {
        Some(input) => PathBuf::from(input),
        None => {
            eprintln!("No input file provided\n\n{}", USAGE);
            return ExitCode::FAILURE;
        }
    };
    let file_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.to_string_lossy().into_owned());

    let source = match read_to_string(&input) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Failed to read {}: {}", input.display(), error);
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();

    let mut compilation = match parse_source(&source, &file_name) {
        Ok(compilation) => compilation,
        Err(error) => {
            display_error(&error, &source, input);
            return ExitCode::FAILURE;
        }
    };
    info!(elapsed = ?start.elapsed(), "Parsed");

    if let Some(ast_file) = &options.ast_file {
        let dump = format!("{:#?}\n", compilation.program());
        if let Err(error) = write_output(ast_file, &dump) {
            eprintln!("Failed to write {}: {}", ast_file.display(), error);
            return ExitCode::FAILURE;
        }
        debug!(file = %ast_file.display(), "Wrote tree dump");
    }

    let stage = if options.no_compile {
        compilation.check();
        compilation.infer()
    } else {
        compilation.run()
    };

    let diagnostics = compilation.diagnostics();
    if diagnostics.has_warnings() {
        eprint!("{}", diagnostics.render_warnings());
    }

    if stage == Stage::Failed {
        eprint!("{}", diagnostics.render_errors());
        return ExitCode::FAILURE;
    }

    if let Some(output) = compilation.output() {
        if let Err(error) = write_output(&options.output, output) {
            eprintln!("Failed to write {}: {}", options.output.display(), error);
            return ExitCode::FAILURE;
        }
        info!(file = %options.output.display(), elapsed = ?start.elapsed(), "Generated");
    }

    ExitCode::SUCCESS
}
