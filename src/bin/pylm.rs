//! Language Model Binary
//!
//! Trains a fixed- or variable-order Pitman-Yor language model on a
//! corpus, then scores each line of stdin.
//!
//! Options: --corpus, --tokens, --config, --model, --epochs, --seed, --dump

use anyhow::Context;
use clap::Parser;
use pylm::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Train a Pitman-Yor language model and score queries from stdin", long_about = None)]
struct Args {
    /// Training corpus, one sequence per line.
    #[arg(long, default_value = "demos/wagahai.txt")]
    corpus: PathBuf,
    /// Read corpus and queries as whitespace-separated integer tokens.
    #[arg(long)]
    tokens: bool,
    /// JSON settings file; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    model: Option<Variant>,
    /// Maximum context length of the fixed-order model.
    #[arg(long)]
    degree: Option<usize>,
    #[arg(long)]
    discount: Option<Probability>,
    #[arg(long)]
    strength: Option<Probability>,
    /// Stop prior pseudo-count of the variable-order model.
    #[arg(long)]
    alpha: Option<Probability>,
    /// Pass-through prior pseudo-count of the variable-order model.
    #[arg(long)]
    beta: Option<Probability>,
    #[arg(long)]
    alphabet: Option<usize>,
    #[arg(long)]
    epochs: Option<Epoch>,
    /// Monte Carlo samples per position when scoring.
    #[arg(long)]
    samples: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// Print the trained tree to stderr before scoring.
    #[arg(long)]
    dump: bool,
}

impl Args {
    fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings = match self.config {
            Some(ref path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(model) = self.model {
            settings.model = model;
        }
        if let Some(degree) = self.degree {
            settings.degree = degree;
        }
        if let Some(discount) = self.discount {
            settings.discount = Some(discount);
        }
        if let Some(strength) = self.strength {
            settings.strength = strength;
        }
        if let Some(alpha) = self.alpha {
            settings.alpha = alpha;
        }
        if let Some(beta) = self.beta {
            settings.beta = beta;
        }
        if let Some(alphabet) = self.alphabet {
            settings.alphabet = alphabet;
        }
        if let Some(epochs) = self.epochs {
            settings.epochs = epochs;
        }
        if let Some(samples) = self.samples {
            settings.samples = samples;
        }
        if let Some(seed) = self.seed {
            settings.seed = Some(seed);
        }
        settings.validate()?;
        Ok(settings)
    }
}

fn main() -> anyhow::Result<()> {
    pylm::log()?;
    let args = Args::parse();
    let settings = args.settings()?;
    log::info!("{:?}", settings);
    let reader = std::io::BufReader::new(
        std::fs::File::open(&args.corpus)
            .with_context(|| format!("open corpus {}", args.corpus.display()))?,
    );
    let stdin = std::io::stdin().lock();
    if args.tokens {
        let corpus = Corpus::read_tokens(reader)?;
        let queries = Corpus::read_tokens(stdin).context("read queries")?;
        dispatch(&settings, corpus, queries, args.dump)
    } else {
        let corpus = Corpus::read(reader)?;
        let queries = Corpus::read(stdin).context("read queries")?;
        dispatch(&settings, corpus, queries, args.dump)
    }
}

fn dispatch<S: Symbol>(
    settings: &Settings,
    corpus: Corpus<S>,
    queries: Corpus<S>,
    dump: bool,
) -> anyhow::Result<()> {
    match settings.model {
        Variant::Fixed => {
            let model = Hpylm::new(settings.degree, settings.pitman()?);
            run(settings, model, corpus, queries, dump, false)
        }
        Variant::Variable => {
            let model = Vpylm::new(settings.beta()?, settings.pitman()?)
                .with_samples(settings.samples);
            run(settings, model, corpus, queries, dump, true)
        }
    }
}

fn run<S, L>(
    settings: &Settings,
    model: L,
    corpus: Corpus<S>,
    queries: Corpus<S>,
    dump: bool,
    perplexity: bool,
) -> anyhow::Result<()>
where
    S: Symbol,
    L: Language<S> + Sync,
{
    let seed = settings.seed.unwrap_or_else(rand::random);
    log::info!("seed {}", seed);
    let ref mut rng = SmallRng::seed_from_u64(seed);
    log::info!("corpus {} sequences, {} symbols", corpus.len(), corpus.symbols());
    let trainer = Trainer::new(model, corpus).train(settings.epochs, rng);
    let model = trainer.into_model();
    if dump {
        eprint!("{}", model.tree());
    }
    let queries = queries.into_iter().collect::<Vec<_>>();
    let scores = model.score_batch(&queries, seed);
    let mut stdout = std::io::stdout().lock();
    for score in scores {
        write!(stdout, "{}", score)?;
        if perplexity {
            writeln!(stdout, "{}", score.perplexity())?;
        }
        writeln!(stdout)?;
    }
    Ok(())
}
