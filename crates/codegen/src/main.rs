//! packjson-schemac: compiles a record schema into a native header and a
//! runtime metadata table, written as `<base>.h` and `<base>.c`.

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;

mod logging;

#[derive(Debug, clap::Parser)]
#[command(
    name = "packjson-schemac",
    version,
    about = "Compiles record schemas into a native header and runtime metadata tables"
)]
struct Args {
    /// Base path of the generated artifacts; writes <base>.h and <base>.c.
    #[arg(long)]
    output: PathBuf,

    /// The schema source file.
    input: PathBuf,

    #[clap(flatten)]
    log: logging::LogArgs,
}

fn main() {
    // Exit status is 1 for every failure; clap reports usage errors as 2,
    // so remap them.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            std::process::exit(1);
        }
    };
    logging::init(&args.log);

    if let Err(err) = run(&args) {
        // Compile errors render as "<input>:<line>: <message>"; everything
        // else as "<input>: <message>".
        match err.downcast_ref::<schema::Error>() {
            Some(compile) => eprintln!("{}:{}", args.input.display(), compile),
            None => eprintln!("{}: {}", args.input.display(), err),
        }
        std::process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let source = std::fs::read(&args.input).map_err(|err| anyhow!("error reading: {err}"))?;

    let unit = schema::parse(&source)?;
    let compiled = codegen::compile(&unit)?;
    tracing::debug!(records = unit.records.len(), "compiled schema unit");

    let header_path = PathBuf::from(format!("{}.h", args.output.display()));
    let source_path = PathBuf::from(format!("{}.c", args.output.display()));
    let header_name = header_path
        .file_name()
        .and_then(|name| name.to_str())
        .context("invalid output path")?
        .to_owned();

    let guard = codegen::include_guard(&header_name);
    let header = codegen::header::emit(&unit, &compiled, &guard);
    let metadata = codegen::source::emit(&unit, &compiled, &header_name);

    std::fs::write(&header_path, header)
        .map_err(|err| anyhow!("error writing {}: {err}", header_path.display()))?;
    std::fs::write(&source_path, metadata)
        .map_err(|err| anyhow!("error writing {}: {err}", source_path.display()))?;

    tracing::info!(
        header = %header_path.display(),
        metadata = %source_path.display(),
        "wrote artifacts"
    );
    Ok(())
}
