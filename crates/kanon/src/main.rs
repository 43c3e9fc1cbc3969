use anyhow::Context as _;
use clap::Parser;
use kanon::{lr1::Automaton, parse_table::ParseTable, parser::ParserDefinition, syntax, tokenize};
use kanon_runtime::{Engine, SemanticActions, Token as _};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Print the automaton states before parsing.
    #[arg(long)]
    states: bool,

    /// Print the action table before parsing.
    #[arg(long)]
    table: bool,

    /// The path of the grammar definition file.
    input: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    tracing::debug!("parsed CLI args = {:?}", args);

    run(&args)
        .with_context(|| anyhow::anyhow!("errored during processing {}", args.input.display()))
}

fn run(args: &Args) -> anyhow::Result<()> {
    let file = syntax::parse_file(&args.input) //
        .context("failed to load the grammar file")?;
    let grammar = file.grammar;
    println!("{}", grammar);

    let automaton = Automaton::generate(&grammar);
    tracing::info!("automaton has {} states", automaton.state_count());
    if args.states {
        println!("{}", automaton.display(&grammar));
    }

    let table = ParseTable::generate(&grammar, &automaton);
    // Ambiguity is a property of the grammar; bail before reading any input.
    table.check(&grammar, &automaton)?;
    if args.table {
        println!("{}", table.display(&grammar));
    }

    if file.actions.iter().any(Option::is_some) || file.init.is_some() {
        tracing::warn!(
            "action blocks in the grammar file are not executable here; \
             bind callbacks through the library API instead"
        );
    }

    let def = ParserDefinition::new(&grammar, &table);
    let actions = SemanticActions::new(|token: &tokenize::InputToken| token.text().to_owned());
    let mut engine = Engine::new(def, actions);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        println!("Enter input:");
        io::stdout().flush()?;
        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };

        let tokens = match tokenize::tokenize(&grammar, &line) {
            Ok(tokens) => tokens,
            Err(err) => {
                println!("not in language ({})", err);
                continue;
            }
        };

        match engine.parse(tokens) {
            Ok(parsed) => {
                print!("{}", parsed.tree.display());
                println!("in language");
            }
            Err(err) => println!("not in language ({})", err),
        }
    }

    Ok(())
}
