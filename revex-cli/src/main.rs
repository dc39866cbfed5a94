use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::debug;
use revex_core::{
    DEFAULT_STATE_LIMIT, Dfa, Engine, Nfa, Regex, RegexBuilder, minimize, parse, to_dot,
};
use std::fmt::Display;

#[derive(Parser)]
#[command(name = "revex")]
#[command(about = "Revex - a regex to minimized DFA compiler")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match a pattern against input, anchored at a start offset
    Match {
        /// The regex pattern
        pattern: String,
        /// The input string
        input: String,
        /// Byte offset to start matching at
        #[arg(short, long, default_value_t = 0)]
        start: usize,
        /// Engine to run the match with
        #[arg(short, long, value_enum, default_value_t = EngineArg::Dfa)]
        engine: EngineArg,
        /// Skip DFA minimization
        #[arg(long)]
        no_minimize: bool,
    },
    /// Print one stage of the compiled pattern
    Dump {
        /// The regex pattern
        pattern: String,
        /// Which stage to print
        #[arg(long, value_enum, default_value_t = Stage::Dfa)]
        stage: Stage,
        /// Skip DFA minimization
        #[arg(long)]
        no_minimize: bool,
    },
    /// Export the DFA as a GraphViz digraph
    Dot {
        /// The regex pattern
        pattern: String,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
        /// Skip DFA minimization
        #[arg(long)]
        no_minimize: bool,
    },
    /// Show the size of every compilation stage
    Stats {
        /// The regex pattern
        pattern: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum EngineArg {
    Dfa,
    Sim,
}

impl From<EngineArg> for Engine {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Dfa => Engine::Dfa,
            EngineArg::Sim => Engine::Simulation,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Stage {
    Program,
    Nfa,
    Dfa,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Match {
            pattern,
            input,
            start,
            engine,
            no_minimize,
        } => cmd_match(&pattern, &input, start, engine.into(), !no_minimize),
        Commands::Dump {
            pattern,
            stage,
            no_minimize,
        } => cmd_dump(&pattern, stage, !no_minimize),
        Commands::Dot {
            pattern,
            output,
            no_minimize,
        } => cmd_dot(&pattern, output.as_deref(), !no_minimize),
        Commands::Stats { pattern } => cmd_stats(&pattern),
    }
}

fn fail(error: impl Display) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), error);
    std::process::exit(1);
}

fn build(pattern: &str, minimized: bool) -> Regex {
    debug!("building {:?} (minimize: {})", pattern, minimized);
    RegexBuilder::new(pattern)
        .minimize(minimized)
        .build()
        .unwrap_or_else(|e| fail(e))
}

fn cmd_match(pattern: &str, input: &str, start: usize, engine: Engine, minimized: bool) {
    let regex = build(pattern, minimized);
    let haystack = input.as_bytes();

    match regex.find_at(haystack, start, engine) {
        Some(m) => {
            println!("{}", "✓ Match found!".green().bold());
            println!("  Position: {}..{}", m.start, m.end);
            println!(
                "  Match:    {}",
                String::from_utf8_lossy(m.as_bytes(haystack)).green()
            );
        }
        None => {
            println!("{}", "✗ No match".red());
            std::process::exit(1);
        }
    }
}

fn cmd_dump(pattern: &str, stage: Stage, minimized: bool) {
    let regex = build(pattern, minimized);

    match stage {
        Stage::Program => {
            println!("{}", "Instructions:".bold());
            print!("{}", regex.program());
        }
        Stage::Nfa => {
            println!("{}", "NFA:".bold());
            print!("{}", Nfa::from_program(regex.program()));
        }
        Stage::Dfa => {
            println!("{}", "DFA:".bold());
            print!("{}", regex.dfa());
        }
    }
}

fn cmd_dot(pattern: &str, output: Option<&str>, minimized: bool) {
    let dot = to_dot(build(pattern, minimized).dfa());

    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, dot) {
                fail(e);
            }
            println!("{} {}", "Wrote".bold(), path.green());
        }
        None => print!("{dot}"),
    }
}

fn cmd_stats(pattern: &str) {
    let program = parse(pattern).unwrap_or_else(|e| fail(e));
    let nfa = Nfa::from_program(&program);
    let mut dfa = Dfa::from_nfa(&nfa, Some(DEFAULT_STATE_LIMIT)).unwrap_or_else(|e| fail(e));
    let constructed = dfa.len();
    minimize(&mut dfa);

    println!("{}", "Compilation stages:".bold());
    println!("  Pattern:       {}", pattern.cyan());
    println!("  Instructions:  {}", program.len());
    println!("  NFA states:    {}", nfa.len());
    println!("  DFA states:    {}", constructed);
    println!("  Minimized:     {}", dfa.len().to_string().green());
}
