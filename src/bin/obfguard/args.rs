// Copyright (c) 2017 Jason White
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use failure::Fail;
use log::warn;
use structopt::StructOpt;
use termcolor::{self as tc, WriteColor};

use obfguard::error::{ErrorKind, ResultExt, Result};
use obfguard::{engine, graph, report, Rules};

use crate::opts::GlobalOpts;

/// Decides which symbols in a symbol graph must be excluded from
/// identifier obfuscation, per a YAML rule database, and writes the
/// resulting exclusion list.
#[derive(StructOpt, Debug)]
pub struct Args {
    #[structopt(flatten)]
    global: GlobalOpts,

    /// Path to the symbol graph JSON file.
    #[structopt(parse(from_os_str))]
    graph: PathBuf,

    /// Path to the rule database (YAML).
    #[structopt(
        long = "rules",
        default_value = "rules/exclusion_rules.yaml",
        parse(from_os_str)
    )]
    rules: PathBuf,

    /// Path to write the structured JSON exclusion report to.
    #[structopt(
        long = "output",
        default_value = "exclusion_list.json",
        parse(from_os_str)
    )]
    output: PathBuf,

    /// Path to write the sorted, name-only exclusion list to.
    #[structopt(
        long = "txt-output",
        default_value = "exclusion_list.txt",
        parse(from_os_str)
    )]
    txt_output: PathBuf,

    /// Treat recoverable rule/condition load warnings as fatal errors.
    /// Off by default, matching the engine's "never larger, only
    /// possibly smaller" exclusion-list guarantee.
    #[structopt(long = "strict")]
    strict: bool,
}

impl Args {
    /// Runs the tool, printing any fatal error (and its cause chain) to
    /// stdout. Returns the process exit code.
    pub fn main(self) -> i32 {
        let color = self.global.color;

        if let Err(error) = self.run() {
            let mut red = tc::ColorSpec::new();
            red.set_fg(Some(tc::Color::Red));
            red.set_bold(true);

            let mut stdout = tc::StandardStream::stdout(color.into());

            let mut causes = error.causes();

            if let Some(cause) = causes.next() {
                let _ = stdout.set_color(&red);
                let _ = write!(&mut stdout, "    Error");
                let _ = stdout.reset();
                let _ = writeln!(&mut stdout, ": {}", cause);
            }

            for cause in causes {
                let _ = stdout.set_color(&red);
                let _ = write!(&mut stdout, "Caused by");
                let _ = stdout.reset();
                let _ = writeln!(&mut stdout, ": {}", cause);
            }

            return 1;
        }

        0
    }

    fn run(self) -> Result<()> {
        let symbol_graph = load_graph(&self.graph)?;

        let (rules, diagnostics) = Rules::from_path(&self.rules, self.strict)?;

        for diagnostic in &diagnostics {
            warn!("{}", diagnostic);
        }
        if !diagnostics.is_empty() {
            println!(
                "Skipped {} malformed rule(s)/condition(s) (see warnings above).",
                diagnostics.len()
            );
        }

        let result = engine::run(&symbol_graph, &rules);
        let rendered_report = report::assemble(&symbol_graph, &result);
        let names = report::name_list(&rendered_report);

        report::write_json_report(&rendered_report, &self.output)?;
        report::write_name_list(&names, &self.txt_output)?;

        println!("Exclusion report written to {}", self.output.display());
        println!("Exclusion name list written to {}", self.txt_output.display());
        println!();
        print!("{}", report::summary(&rendered_report, &result));

        Ok(())
    }
}

fn load_graph(path: &PathBuf) -> Result<graph::SymbolGraph> {
    let file = File::open(path).context(ErrorKind::GraphUnreadable(path.clone()))?;
    graph::load::from_reader(file)
}
