use country_converter::{ConvertRun, MatchFlags, NameTrace, Resolution};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const RED: &str = "\x1b[31m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

/// Print how each name of `run` was resolved into `to`.
pub fn print_run(run: &ConvertRun, to: &str, color: bool) {
    let palette = ansi::Palette::new(color);
    let names = &run.details.names;
    let results = run.output.clone().into_vec();
    println!(
        "\n{}",
        palette.bold(palette.paint(format!("⚙  Converting {} name(s) to {to}", names.len()), ansi::CYAN))
    );

    println!("\n{}", palette.paint("━━━ Names ━━━", ansi::GRAY));
    for (idx, (trace, result)) in names.iter().zip(&results).enumerate() {
        print_name(idx, trace, result, &palette);
    }

    println!("\n{}", palette.paint("━━━ Summary ━━━", ansi::GRAY));
    let missed = names.iter().filter(|t| !t.found()).count();
    let multiple = names.iter().filter(|t| t.flags.contains(MatchFlags::MULTIPLE)).count();
    println!(
        "  Found: {}  │  Not found: {}  │  Multiple: {}",
        palette.paint((names.len() - missed).to_string(), ansi::GREEN),
        if missed > 0 { palette.paint(missed.to_string(), ansi::RED) } else { palette.dim("0") },
        if multiple > 0 { palette.paint(multiple.to_string(), ansi::YELLOW) } else { palette.dim("0") },
    );

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    let resolving: std::time::Duration = names.iter().map(|t| t.elapsed).sum();
    println!(
        "  Total: {}  │  Resolve: {}",
        palette.paint(format!("{:?}", run.details.total), ansi::GREEN),
        palette.dim(format!("{resolving:?}")),
    );
    println!();
}

fn print_name(idx: usize, trace: &NameTrace, result: &Resolution, palette: &ansi::Palette) {
    let outcome = if !trace.found() {
        palette.paint(format!("✗ {result}"), ansi::RED)
    } else if trace.flags.contains(MatchFlags::MULTIPLE) {
        palette.paint(format!("⚠ {result}"), ansi::YELLOW)
    } else {
        palette.bold(palette.paint(result.to_string(), ansi::GREEN))
    };
    println!(
        "  {} {} {} {}",
        palette.paint(format!("[{idx}]"), ansi::GRAY),
        palette.paint(format!("\"{}\"", trace.input), ansi::CYAN),
        palette.dim("→"),
        outcome
    );

    let source = if trace.flags.contains(MatchFlags::INFERRED_SOURCE) {
        format!("{} (inferred)", trace.source)
    } else {
        trace.source.clone()
    };
    let lookup = if trace.flags.contains(MatchFlags::PATTERN) { "pattern" } else { "exact" };
    println!(
        "      {} {}  {} {}",
        palette.dim("src:"),
        palette.paint(source, ansi::BLUE),
        palette.dim("│ lookup:"),
        palette.paint(lookup, ansi::BLUE)
    );
    if let Some(excluded) = &trace.excluded {
        println!(
            "      {} {}  {} {}",
            palette.dim("head:"),
            palette.paint(format!("\"{}\"", trace.head), ansi::CYAN),
            palette.dim("│ dropped:"),
            palette.dim(format!("\"{excluded}\""))
        );
    }
    if !trace.rows.is_empty() {
        let rows: Vec<String> =
            trace.rows.iter().zip(&trace.labels).map(|(row, label)| format!("#{row} {label}")).collect();
        println!("      {} {}", palette.dim("rows:"), palette.paint(rows.join(", "), ansi::YELLOW));
    }
}
