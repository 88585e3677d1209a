use anyhow::Result;
use clap::{Parser, Subcommand};
mod auth;
use salted::{Argon2Params, Mode, STDIO_PATH, default_output_path};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, clap::Args)]
struct Argon2Args {
    /// Argon2 time cost / iterations (default: 1)
    #[arg(long = "argon-time")]
    time_cost: Option<u32>,

    /// Argon2 memory cost in KiB (default: 2097152)
    #[arg(long = "argon-mem")]
    memory_cost_kib: Option<u32>,

    /// Argon2 lanes (default: 4)
    #[arg(long = "argon-lanes")]
    lanes: Option<u8>,
}

impl Argon2Args {
    fn to_params(&self) -> Result<Argon2Params> {
        let default = Argon2Params::default();

        Ok(Argon2Params::new(
            self.time_cost.unwrap_or(default.time_cost()),
            self.memory_cost_kib.unwrap_or(default.memory_cost_kib()),
            self.lanes.unwrap_or(default.lanes()),
        )?)
    }
}

#[derive(Debug, Parser)]
#[command(name = "salted")]
#[command(
    version,
    about = "Encrypts and decrypts files with a passphrase, chunk by chunk."
)]
struct Cli {
    /// Print diagnostic tracing to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Encrypts a file ("-" for stdin)
    #[command(arg_required_else_help = true)]
    Encrypt {
        input: PathBuf,

        /// Output path ("-" for stdout; default: <INPUT>.salted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        #[command(flatten)]
        argon2: Argon2Args,
    },

    /// Decrypts and verifies a file ("-" for stdin)
    #[command(arg_required_else_help = true)]
    Decrypt {
        input: PathBuf,

        /// Output path ("-" for stdout; default: <INPUT>.decrypted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Shows header information of an encrypted file
    #[command(arg_required_else_help = true)]
    Info {
        input: PathBuf,

        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn is_stdio(path: &Path) -> bool {
    path == Path::new(STDIO_PATH)
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    match args.command {
        Commands::Encrypt {
            input,
            output,
            argon2,
        } => {
            let params = argon2.to_params()?;
            let output = output.unwrap_or_else(|| default_output_path(&input, Mode::Encrypt));
            let passphrase = auth::read_passphrase(is_stdio(&input), true)?;

            let summary =
                salted::encrypt_file(&input, &output, &passphrase, params, args.verbose)?;
            if !is_stdio(&output) {
                println!(
                    "encrypted {} chunk(s) to {}",
                    summary.chunks,
                    output.display()
                );
            }
        }
        Commands::Decrypt { input, output } => {
            let output = output.unwrap_or_else(|| default_output_path(&input, Mode::Decrypt));
            let passphrase = auth::read_passphrase(is_stdio(&input), false)?;

            let summary = salted::decrypt_file(&input, &output, &passphrase, args.verbose)?;
            if !is_stdio(&output) {
                println!(
                    "decrypted {} chunk(s) to {}",
                    summary.chunks,
                    output.display()
                );
            }
        }
        Commands::Info { input, json } => {
            let info = salted::inspect_file(&input)?.info();
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{info}");
            }
        }
    }

    Ok(())
}
