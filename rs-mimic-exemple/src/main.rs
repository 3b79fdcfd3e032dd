use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rs_mimic_core::config::LearningConfig;
use rs_mimic_core::io::read_examples;
use rs_mimic_core::learning::Learner;
use rs_mimic_core::model::imitation_input::ImitationInput;
use rs_mimic_core::model::imitator::Imitator;
use rs_mimic_core::random::undeterministic_seed;

/// Learn example words and print imitations of them.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// File with one example per line (stdin when omitted)
    input: Option<PathBuf>,

    /// Number of words to generate
    #[arg(short, long, default_value_t = 10)]
    count: usize,

    /// Steps before a word is allowed to end
    #[arg(long, default_value_t = 4)]
    min_len: usize,

    /// Maximum generated characters per word
    #[arg(long, default_value_t = 15)]
    max_len: usize,

    /// RNG seed (random when omitted)
    #[arg(short, long)]
    seed: Option<u32>,

    /// Time granted to each learning tick, in milliseconds
    #[arg(long, default_value_t = 8)]
    tick_budget_ms: u64,

    /// Example lines tokenized per chunk
    #[arg(long, default_value_t = 64)]
    lines_per_chunk: usize,

    /// Matches folded per chunk
    #[arg(long, default_value_t = 512)]
    matches_per_chunk: usize,

    /// Print the learned chain as JSON
    #[arg(long)]
    dump_chain: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let text = match &args.input {
        Some(path) => read_examples(path)?,
        None => std::io::read_to_string(std::io::stdin())?,
    };

    // Chunk sizes bound how much work one tick can do; the budget bounds how long it may run
    let mut config = LearningConfig::default();
    config.set_lines_per_chunk(args.lines_per_chunk)?;
    config.set_matches_per_chunk(args.matches_per_chunk)?;
    config.set_tick_budget(Duration::from_millis(args.tick_budget_ms))?;

    // Learning fails as a whole: no imitator is built from a partial chain
    let learned = Learner::new(config).learn_blocking(&text, |progress| {
        if !progress.is_completed {
            info!(percent = progress.percent_complete, label = %progress.label, "learning");
        }
    })?;
    info!(
        lines = learned.lines,
        matches = learned.matches,
        busy_ms = learned.busy_duration.as_millis() as u64,
        wall_ms = learned.wall_clock_duration.as_millis() as u64,
        "chain learned"
    );

    if args.dump_chain {
        println!("{}", serde_json::to_string_pretty(&learned.chain)?);
    }

    let mut input = ImitationInput::default();
    input.imitation_count = args.count;
    input.set_word_lengths(args.min_len, args.max_len)?;
    input.seed = args.seed.unwrap_or_else(undeterministic_seed);
    info!(seed = input.seed, "imitating");

    // Markers: '.' clean end, '!' dead end too early, '!!' no allowed successor, none when cut at max length
    let mut imitator = Imitator::new(learned.chain, input.seed);
    let words = imitator.imitate_many(input.imitation_count, input.word_length_min(), input.word_length_max())?;
    for (i, word) in words.iter().enumerate() {
        println!("Generated word {}: {}", i + 1, word);
    }

    Ok(())
}
