//! sat-report CLI - filter, sort and tabulate records

use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::LevelFilter;

use sat_report::cli::{Args, RenderArgs, SubCommand};
use sat_report::input::{Dataset, InputFormat};
use sat_report::{parse_filter, resolve_key};

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn run(args: Args) -> Result<()> {
    match args.command {
        SubCommand::Render(render) => run_render(&render),

        SubCommand::Explain { query, fields } => {
            let filter = parse_filter(&query, fields.as_slice())?;
            let dependent: Vec<String> = filter.dependent_fields().into_iter().collect();
            println!("Filter: {}", filter);
            println!("Fields: {}", dependent.join(", "));
            Ok(())
        }

        SubCommand::Resolve { key, fields } => match resolve_key(&key, fields.as_slice()) {
            Some(field) => {
                println!("{}", field);
                Ok(())
            }
            None => bail!("'{}' does not match any of: {}", key, fields.join(", ")),
        },
    }
}

fn run_render(render: &RenderArgs) -> Result<()> {
    let (path, content) = if render.input == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read stdin")?;
        (None, content)
    } else {
        let path = Path::new(&render.input);
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        (Some(path), content)
    };

    let format = InputFormat::detect(path, &content);
    log::debug!("Reading {} as {:?}", render.input, format);

    let dataset = Dataset::load(&content, format, render.headings.as_deref())
        .with_context(|| format!("Failed to load {}", render.input))?;
    let report = dataset.into_output(render.report_options())?;

    let output = report.try_render(render.format)?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
