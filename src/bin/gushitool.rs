use std::fs;
use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use gushi_engine::engine::Engine;
use gushi_engine::lexicon::TopicLexicon;
use gushi_engine::{candidates, settings};

#[derive(Parser)]
#[command(name = "gushitool", about = "Verse generation diagnostics")]
struct Cli {
    /// Path to a settings TOML file (defaults are built in)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the most fluent opening line(s) for a topic
    Generate {
        /// Topic name, matched against lexicon block headers
        topic: String,
        /// Number of ranked lines to print
        #[arg(short, long, default_value = "1")]
        n: usize,
        /// Fix the sampling seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List topic block headers in a lexicon file
    Topics {
        /// Path to the lexicon file
        lexicon_file: String,
    },

    /// Show the admissible keyword phrases for a topic
    Lookup {
        /// Path to the lexicon file
        lexicon_file: String,
        /// Topic name
        topic: String,
    },

    /// Dump unscored candidate lines for a topic
    Candidates {
        /// Path to the lexicon file
        lexicon_file: String,
        /// Topic name
        topic: String,
        /// Fix the sampling seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
        /// Per-partition sampling cap
        #[arg(long, default_value = "20")]
        cap: usize,
    },
}

fn open_lexicon(lexicon_file: &str) -> TopicLexicon {
    TopicLexicon::open(Path::new(lexicon_file)).unwrap_or_else(|e| {
        eprintln!("Failed to open lexicon at {}: {}", lexicon_file, e);
        process::exit(1);
    })
}

fn main() {
    let cli = Cli::parse();
    gushi_engine::trace_init::init_tracing(&std::env::temp_dir());

    if let Some(config) = &cli.config {
        let content = fs::read_to_string(config).unwrap_or_else(|e| {
            eprintln!("Failed to read config {}: {}", config, e);
            process::exit(1);
        });
        settings::init_custom(content).unwrap_or_else(|e| {
            eprintln!("Invalid config {}: {}", config, e);
            process::exit(1);
        });
    }

    match cli.command {
        Command::Generate {
            topic,
            n,
            seed,
            json,
        } => {
            let mut engine = Engine::from_settings().unwrap_or_else(|e| {
                eprintln!("Failed to initialize engine: {}", e);
                process::exit(1);
            });
            if let Some(seed) = seed {
                engine = engine.with_seed(seed);
            }

            let ranked = engine.generate_nbest(&topic, n).unwrap_or_else(|e| {
                eprintln!("Generation failed: {}", e);
                process::exit(1);
            });

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&ranked).expect("JSON serialization failed")
                );
            } else {
                for scored in &ranked {
                    println!("{}\t{:.2}", scored.line, scored.ppl);
                }
            }
        }

        Command::Topics { lexicon_file } => {
            let lexicon = open_lexicon(&lexicon_file);
            for header in lexicon.topics() {
                println!("{}", header);
            }
        }

        Command::Lookup {
            lexicon_file,
            topic,
        } => {
            let lexicon = open_lexicon(&lexicon_file);
            let default_topic = &settings::settings().lexicon.default_topic;
            let phrases = lexicon
                .lookup_or_default(&topic, default_topic)
                .unwrap_or_else(|e| {
                    eprintln!("Lookup failed: {}", e);
                    process::exit(1);
                });
            for phrase in phrases {
                println!("{}", phrase.as_str());
            }
        }

        Command::Candidates {
            lexicon_file,
            topic,
            seed,
            cap,
        } => {
            let lexicon = open_lexicon(&lexicon_file);
            let default_topic = &settings::settings().lexicon.default_topic;
            let phrases = lexicon
                .lookup_or_default(&topic, default_topic)
                .unwrap_or_else(|e| {
                    eprintln!("Lookup failed: {}", e);
                    process::exit(1);
                });

            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            for line in candidates::generate(phrases, cap, &mut rng) {
                println!("{}", line);
            }
        }
    }
}
