use clap::{Parser as ClapParser, Subcommand};
use gqlshape::cli::{
    self, CliError, DecodeOptions, EvalOptions, NormalizeOptions, VariantsOptions,
};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "gqlshape")]
#[command(
    about = "gqlshape - inspect GraphQL inclusion conditions and decode responses with typed adapters"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a condition, e.g. '$withFriends & !$compact'
    Eval {
        /// The condition to evaluate
        condition: String,

        /// A variable that is true (repeatable); all others are false
        #[arg(short, long = "var")]
        vars: Vec<String>,

        /// Runtime __typename for type(...) terms
        #[arg(short, long)]
        typename: Option<String>,
    },

    /// Print the canonical normal form of a condition
    Normalize {
        /// The condition to normalize
        condition: String,

        /// Only apply syntactic simplification
        #[arg(long)]
        simplify_only: bool,
    },

    /// Group field conditions and count the response shapes they allow
    Variants {
        /// One condition per field
        #[arg(required = true)]
        conditions: Vec<String>,

        /// Candidate runtime typename (repeatable)
        #[arg(short, long = "typename")]
        typenames: Vec<String>,
    },

    /// Decode JSON as a GraphQL type and print it back out
    Decode {
        /// GraphQL type of the document, e.g. '[Int!]!'
        #[arg(value_name = "TYPE")]
        type_ref: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Map a custom scalar to a built-in, e.g. Date=String (repeatable)
        #[arg(short, long = "scalar")]
        scalars: Vec<String>,
    },
}

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Eval {
            condition,
            vars,
            typename,
        } => cli::execute_eval(&EvalOptions {
            condition,
            variables: vars,
            typename,
        })
        .map(|value| println!("{}", value)),
        Commands::Normalize {
            condition,
            simplify_only,
        } => cli::execute_normalize(&NormalizeOptions {
            condition,
            simplify_only,
        })
        .map(|result| println!("{}", result)),
        Commands::Variants {
            conditions,
            typenames,
        } => cli::execute_variants(&VariantsOptions {
            conditions,
            typenames,
        })
        .map(|report| print!("{}", report)),
        Commands::Decode {
            type_ref,
            input,
            pretty,
            scalars,
        } => run_decode(type_ref, input, pretty, scalars),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_decode(
    type_ref: String,
    input: Option<String>,
    pretty: bool,
    scalars: Vec<String>,
) -> Result<(), CliError> {
    let input = match input {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(CliError::Io)?;
            Some(buffer)
        }
        None => None,
    };

    let options = DecodeOptions {
        type_ref,
        input,
        pretty,
        scalars,
    };

    let result = cli::execute_decode(&options)?;
    println!("{}", result.json);
    Ok(())
}
