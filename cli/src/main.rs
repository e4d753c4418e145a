use clap::{Parser, Subcommand, ValueEnum};
use rand::Rng;

use bitrank_core::{
    decode_code, encode_code, generate_target, puzzle_seed, BitMatrix, Mode, Settings,
    GENERATOR_SEED, N_MAX, N_MIN, RANK_MAX, RANK_MIN,
};

#[derive(Parser)]
#[command(name = "bitrank-cli", version, about = "Inspection tools for bitrank puzzles")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Puzzle {
        #[command(subcommand)]
        command: PuzzleCommand,
    },
}

#[derive(Subcommand)]
enum PuzzleCommand {
    /// Generate a fresh puzzle and print its share code.
    New {
        #[arg(long, default_value_t = 5)]
        n: usize,
        #[arg(long, default_value_t = 3)]
        r: usize,
        #[arg(long, value_enum, default_value = "xor")]
        mode: ModeArg,
        #[arg(long)]
        nonce: Option<u32>,
    },
    /// Decode a share code and print the board it describes.
    Show { code: String },
    /// Decode a share code and print its canonical uppercase form.
    Reencode { code: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Or,
    Xor,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Or => Mode::Or,
            ModeArg::Xor => Mode::Xor,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Puzzle { command } => match command {
            PuzzleCommand::New { n, r, mode, nonce } => {
                let Some(settings) = Settings::new(n, r, mode.into()) else {
                    eprintln!(
                        "settings out of range: n must be {N_MIN}..={N_MAX}, r must be {RANK_MIN}..={RANK_MAX}"
                    );
                    return Ok(());
                };
                let nonce = nonce.unwrap_or_else(|| rand::thread_rng().gen());
                let seed = puzzle_seed(GENERATOR_SEED, nonce, settings.n, settings.r);
                let target = generate_target(&settings, seed);
                println!("nonce: {nonce}");
                print_puzzle(&settings, &target);
            }
            PuzzleCommand::Show { code } => match decode_code(&code) {
                Ok((settings, target)) => print_puzzle(&settings, &target),
                Err(err) => eprintln!("invalid code: {err}"),
            },
            PuzzleCommand::Reencode { code } => match decode_code(&code) {
                Ok((settings, target)) => println!("{}", encode_code(&settings, &target)),
                Err(err) => eprintln!("invalid code: {err}"),
            },
        },
    }

    Ok(())
}

fn print_puzzle(settings: &Settings, target: &BitMatrix) {
    let mode = match settings.mode {
        Mode::Or => "or",
        Mode::Xor => "xor",
    };
    println!("n: {}  r: {}  mode: {}", settings.n, settings.r, mode);
    println!("code: {}", encode_code(settings, target));
    for i in 0..settings.n {
        let row: String = (0..settings.n)
            .map(|j| if target.get(i, j) == 1 { '#' } else { '.' })
            .collect();
        println!("  {row}");
    }
}
