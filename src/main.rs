mod logging;
mod report;

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use country_converter::{ConvertOptions, ConverterOptions, CountryConverter, canonical_alias};
use tracing::debug;

use crate::logging::{LogConfig, init_logging};

#[derive(Parser, Debug)]
#[command(
    name = "coco",
    version,
    about = "Convert country names and codes between classification schemes.",
    after_help = "Exit codes:\n  0  Success.\n  1  Failed to load the country data or to convert.\n  \
                  2  Invalid arguments or missing input."
)]
struct Cli {
    /// Names or codes to convert. Read line by line from stdin when omitted.
    #[arg(value_name = "NAME")]
    names: Vec<String>,

    /// Source classification; inferred from each name when omitted.
    #[arg(short = 's', long = "src", visible_alias = "source", short_alias = 'f', alias = "from")]
    src: Option<String>,

    /// Print the distinct values of a classification instead of converting.
    #[arg(long = "list", value_name = "SCHEME", conflicts_with = "names")]
    list: Option<String>,

    /// Target classification.
    #[arg(short = 't', long = "to", default_value = "ISO3")]
    to: String,

    /// Separator between converted values.
    #[arg(short = 'o', long = "output-sep", default_value = " ")]
    output_sep: String,

    /// Fill for names without a match; `None` keeps the name itself.
    #[arg(short = 'n', long = "not-found", default_value = "not found")]
    not_found: String,

    /// Country data replacing the bundled table (tab separated).
    #[arg(long = "data", value_name = "PATH", env = "COCO_COUNTRY_DATA")]
    data: Option<PathBuf>,

    /// Extra country data appended to the table; later rows win. Repeatable.
    #[arg(short = 'a', long = "additional-data", value_name = "PATH")]
    additional_data: Vec<PathBuf>,

    /// Keep only UN member states.
    #[arg(long = "un-only")]
    un_only: bool,

    /// Keep countries that no longer exist.
    #[arg(long = "include-obsolete")]
    include_obsolete: bool,

    /// Fail when a name matches more than one country.
    #[arg(long = "strict")]
    strict: bool,

    /// Print how each name was resolved.
    #[arg(long = "explain")]
    explain: bool,

    /// Force ANSI color output.
    #[arg(long = "color", overrides_with = "no_color")]
    color: bool,

    /// Disable ANSI color output.
    #[arg(long = "no-color")]
    no_color: bool,

    /// More log output (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    let log_config = LogConfig::from_verbosity(cli.verbose, cli.quiet)
        .with_target(cli.verbose > 1)
        .with_ansi(io::stderr().is_terminal());
    init_logging(&log_config);

    let load = || match CountryConverter::with_options(converter_options(&cli)) {
        Ok(cc) => cc,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    if let Some(scheme) = &cli.list {
        let cc = load();
        match list_values(&cc, scheme) {
            Some(values) => println!("{}", values.join(&cli.output_sep)),
            None => {
                eprintln!("error: {scheme} is not a valid country classification");
                std::process::exit(2);
            }
        }
        return;
    }

    let names = match input_names(&cli) {
        Ok(names) => names,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };
    let cc = load();

    let options = convert_options(&cli);
    let color = if cli.no_color { false } else { cli.color || io::stdout().is_terminal() };
    let result = if cli.explain {
        cc.convert_verbose(names, &options).map(|run| {
            report::print_run(&run, &options.to, color);
            run.output
        })
    } else {
        cc.convert(names, &options)
    };

    match result {
        Ok(output) => {
            let values: Vec<String> = output.into_vec().iter().map(ToString::to_string).collect();
            println!("{}", values.join(&cli.output_sep));
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn input_names(cli: &Cli) -> Result<Vec<String>, String> {
    let names = if cli.names.is_empty() { read_stdin_names()? } else { cli.names.clone() };
    if names.is_empty() {
        return Err("error: no input provided\n\nFor more information, try '--help'.".to_string());
    }
    Ok(names)
}

fn read_stdin_names() -> Result<Vec<String>, String> {
    if io::stdin().is_terminal() {
        return Ok(Vec::new());
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect())
}

fn converter_options(cli: &Cli) -> ConverterOptions {
    let mut options = ConverterOptions::default()
        .with_only_un_member(cli.un_only)
        .with_include_obsolete(cli.include_obsolete)
        .with_strict(cli.strict);
    if let Some(path) = &cli.data {
        options = options.with_country_data(path.clone());
    }
    for path in &cli.additional_data {
        options = options.with_additional_data(path.clone());
    }
    options
}

fn convert_options(cli: &Cli) -> ConvertOptions {
    let not_found = (cli.not_found != "None").then_some(cli.not_found.as_str());
    let mut options = ConvertOptions::default().with_to(&cli.to).with_not_found(not_found);
    if let Some(src) = &cli.src {
        options = options.with_src(src);
    }
    options
}

/// Distinct values of the column named by `scheme`, accepting aliases and
/// any case.
fn list_values(cc: &CountryConverter, scheme: &str) -> Option<Vec<String>> {
    let wanted = canonical_alias(scheme).unwrap_or(scheme);
    let col = cc.valid_class().iter().position(|c| c.eq_ignore_ascii_case(wanted))?;
    debug!(scheme = %cc.valid_class()[col], "listing classification values");
    Some(cc.data().distinct_values(col).iter().map(ToString::to_string).collect())
}
