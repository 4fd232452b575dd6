use std::io::{Read, Write};
use std::path::PathBuf;
use structopt::StructOpt;
use tracing_subscriber::fmt;
use wlpc::{CompileError, CompileOptions};

fn main() {
    if let Err(ref e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), anyhow::Error> {
    use std::fs;

    let opt = Opt::from_args();

    if let Some((_, filter)) = std::env::vars().find(|x| x.0 == "WLPC_TRACE") {
        fmt::Subscriber::builder()
            .with_ansi(true)
            .pretty()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    }

    let derivation = match &opt.file {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            input
        }
    };
    log::debug!("read {} derivation lines", derivation.lines().count());

    let options = CompileOptions { strict: opt.strict };
    let compilation = match wlpc::compile(&derivation, options) {
        Ok(compilation) => compilation,
        Err(CompileError::Rejected(diagnostics)) => {
            for diagnostic in &diagnostics {
                eprintln!("error: {}", diagnostic);
            }
            anyhow::bail!("program rejected with {} error(s)", diagnostics.len());
        }
        Err(e) => return Err(e.into()),
    };

    for diagnostic in &compilation.diagnostics {
        eprintln!("error: {}", diagnostic);
    }
    if opt.symbols {
        eprint!("{}", compilation.symbols);
    }

    match opt.output {
        Some(path) => {
            let mut file = fs::File::create(path)?;
            write!(file, "{}", compilation.output)?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            write!(lock, "{}", compilation.output)?;
        }
    }

    Ok(())
}

#[derive(Debug, StructOpt)]
struct Opt {
    /// The derivation to compile (stdin if absent)
    #[structopt(parse(from_os_str))]
    file: Option<PathBuf>,
    /// The (optional) output file, stdout if absent
    #[structopt(short = "o", long = "output", parse(from_os_str))]
    output: Option<PathBuf>,
    /// Reject the program if there is any semantic error
    #[structopt(long)]
    strict: bool,
    /// Print the symbol tables to stderr
    #[structopt(long)]
    symbols: bool,
}
