use clap::{Parser as ClapParser, Subcommand};
use pathquery::cli::{
    self, CheckOptions, CliError, MutateOptions, QueryOptions, TemplateOptions,
};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "pq")]
#[command(about = "pq - Compile JSONPath-like path queries and run them against JSON")]
#[command(version)]
struct Cli {
    /// Log compilation and traversal to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a path query
    Query {
        /// The path to run, e.g. '$.friends.[?(@.age > 20)].name'
        path: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// JSON context referenced by `$` inside filters
        #[arg(short, long)]
        context: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Report each match with its index in the owning array
        #[arg(long)]
        parents: bool,

        /// Pull matches one at a time
        #[arg(long)]
        lazy: bool,

        /// Stop after this many matches
        #[arg(long, requires = "lazy")]
        limit: Option<usize>,
    },

    /// Write a JSON value into every slot a path addresses
    Mutate {
        /// The path to write through
        path: String,

        /// JSON value to assign
        #[arg(long)]
        value: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// JSON context referenced by `$` inside filters
        #[arg(short, long)]
        context: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Build an object template whose string leaves are paths
    Template {
        /// Template JSON, e.g. '{"names": "$.friends.*.name"}'
        template: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// JSON context referenced by `$` inside filters
        #[arg(short, long)]
        context: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Compile a path and print its plan
    Check {
        /// The path to compile
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("pathquery=trace"))
            .with_writer(io::stderr)
            .init();
    }

    let result = match cli.command {
        Commands::Query {
            path,
            input,
            context,
            pretty,
            parents,
            lazy,
            limit,
        } => read_input(input).and_then(|input| {
            let options = QueryOptions {
                path,
                input,
                context,
                parents,
                lazy,
                limit,
            };
            print_value(cli::execute_query(&options)?, pretty)
        }),
        Commands::Mutate {
            path,
            value,
            input,
            context,
            pretty,
        } => read_input(input).and_then(|input| {
            let options = MutateOptions {
                path,
                value,
                input,
                context,
            };
            print_value(cli::execute_mutate(&options)?, pretty)
        }),
        Commands::Template {
            template,
            input,
            context,
            pretty,
        } => read_input(input).and_then(|input| {
            let options = TemplateOptions {
                template,
                input,
                context,
            };
            print_value(cli::execute_template(&options)?, pretty)
        }),
        Commands::Check { path } => {
            cli::execute_check(&CheckOptions { path }).map(|plan| println!("{}", plan))
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_input(input: Option<String>) -> Result<Option<String>, CliError> {
    match input {
        Some(s) => Ok(Some(s)),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(CliError::Io)?;
            Ok(Some(buffer))
        }
        None => Ok(None),
    }
}

fn print_value(value: pathquery::Value, pretty: bool) -> Result<(), CliError> {
    println!("{}", cli::render_json(value, pretty)?);
    Ok(())
}
