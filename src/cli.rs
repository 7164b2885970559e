//! Command line entry point.
//!
//! ```sh
//! biblioteca start --port 8000
//! biblioteca populate --books 50 --offline --seed 7
//! biblioteca routes
//! biblioteca sparql "SELECT ?s WHERE { ?s a <http://uni.edu/biblioteca.owl#Libro> }"
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::{
    boot::{self, ServeParams},
    controller::ListRoutes,
    environment::{resolve_from_env, Environment, DEFAULT_ENVIRONMENT},
    logger,
    populate::{self, PopulateOptions},
    Result,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Specify the environment
    #[arg(short, long, global = true, help = format!("Specify the environment [default: {DEFAULT_ENVIRONMENT}]"))]
    environment: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    #[command(alias = "s")]
    Start {
        /// Server bind address
        #[arg(short, long)]
        binding: Option<String>,
        /// Server port address
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Fill the store with sample books, authors, publishers and users
    Populate {
        /// Books to create, fetched from DBpedia first
        #[arg(long, default_value_t = 200)]
        books: usize,
        #[arg(long, default_value_t = 100)]
        students: usize,
        #[arg(long, default_value_t = 50)]
        teachers: usize,
        #[arg(long, default_value_t = 20)]
        librarians: usize,
        /// Chance that a student borrows books
        #[arg(long, default_value_t = 0.7)]
        loan_probability: f64,
        /// Generate every book instead of querying DBpedia
        #[arg(long, action)]
        offline: bool,
        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Describe all application endpoints
    Routes {},
    /// Run a SPARQL query against the store and print the rows
    Sparql {
        /// The query text
        query: String,
    },
}

/// Parses the command line and runs the selected command.
///
/// # Errors
///
/// Returns the error of the command that failed.
pub async fn main() -> Result<()> {
    let cli: Cli = Cli::parse();
    let environment: Environment = cli.environment.unwrap_or_else(resolve_from_env).into();

    let config = environment.load()?;
    logger::init(&config.logger);

    match cli.command {
        Commands::Start { binding, port } => {
            let mut params = ServeParams::from_config(&config);
            if let Some(binding) = binding {
                params.binding = binding;
            }
            if let Some(port) = port {
                params.port = port;
            }
            let boot_result = boot::create_app(&environment, config).await?;
            boot::start(boot_result, params).await?;
        }
        Commands::Populate {
            books,
            students,
            teachers,
            librarians,
            loan_probability,
            offline,
            seed,
        } => {
            let options = PopulateOptions {
                books,
                students,
                teachers,
                librarians,
                loan_probability,
                offline,
                seed,
            };
            let populate_settings = config.populate.clone();
            let ctx = boot::create_context(&environment, config).await?;
            let summary = populate::run(&ctx.ontology, &populate_settings, &options).await?;
            println!("{}", "population finished".green().bold());
            println!("{summary}");
        }
        Commands::Routes {} => show_list_endpoints(boot::list_endpoints()),
        Commands::Sparql { query } => {
            let ctx = boot::create_context(&environment, config).await?;
            let results = ctx.ontology.sparql(&query).await?;
            println!("{}", results.variables.join("\t").bold());
            for row in results.rows {
                let cells: Vec<String> = row
                    .iter()
                    .map(|cell| match cell {
                        serde_json::Value::String(text) => text.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                println!("{}", cells.join("\t"));
            }
        }
    }
    Ok(())
}

fn show_list_endpoints(mut routes: Vec<ListRoutes>) {
    routes.sort_by(|a, b| a.uri.cmp(&b.uri));
    for router in routes {
        let actions = router
            .actions
            .iter()
            .map(|action| action.to_string().yellow().to_string())
            .collect::<Vec<_>>()
            .join(",");
        println!("[{actions}] {}", router.uri.green());
    }
}
