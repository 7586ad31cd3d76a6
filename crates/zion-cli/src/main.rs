//! # zion
//!
//! Command-line front end for the Zion SDK:
//! - `resolve`: account id or `name*domain` → federation record
//! - `descriptor`: fetch and print a domain's `zion.toml`
//! - `lookup`: query a known federation server directly
//! - `query`: build (and optionally run) an Equator resource query
//!
//! Process defaults come from `ZION__ALLOW_HTTP` / `ZION__TIMEOUT_MS`, an
//! optional `zion-sdk.toml` and `.env`; the global flags override them.

mod query;

use clap::{Args, Parser, Subcommand};
use zion_common::ResolveOptions;
use zion_equator::EquatorServer;
use zion_federation::{DescriptorResolver, FederationResolver};

#[derive(Parser, Debug)]
#[command(name = "zion")]
#[command(about = "Federation lookups and Equator queries for the Zion ledger", version)]
struct Cli {
    /// Allow plain http:// endpoints (testing only); `--allow-http=false`
    /// overrides an insecure process default
    #[arg(
        long,
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    allow_http: Option<bool>,

    /// Request timeout in milliseconds; 0 disables it
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve an account id or federation address
    Resolve { address: String },
    /// Print a domain's zion.toml
    Descriptor { domain: String },
    /// Ask a federation server directly
    Lookup(LookupArgs),
    /// Build or execute an Equator query
    Query(query::QueryArgs),
}

#[derive(Args, Debug)]
struct LookupArgs {
    /// Federation server URL
    #[arg(long)]
    server: String,

    /// Domain the server answers for; qualifies a bare --name
    #[arg(long)]
    domain: Option<String>,

    #[command(flatten)]
    kind: LookupKind,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct LookupKind {
    /// Federation address or bare name
    #[arg(long)]
    name: Option<String>,

    /// Reverse lookup by account id
    #[arg(long)]
    id: Option<String>,

    /// Lookup by transaction id
    #[arg(long)]
    txid: Option<String>,
}

impl Cli {
    fn options(&self) -> ResolveOptions {
        let mut options = ResolveOptions::new();
        if let Some(allow) = self.allow_http {
            options = options.allow_http(allow);
        }
        if let Some(ms) = self.timeout_ms {
            options = options.timeout_ms(ms);
        }
        options
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zion=info".into()),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    zion_common::config::init()?;

    let cli = Cli::parse();
    let options = cli.options();
    tracing::debug!(?options, "Effective client config: {:?}", options.effective());

    let output = match &cli.command {
        Command::Resolve { address } => {
            let record = FederationResolver::resolve(address, &options).await?;
            serde_json::to_string_pretty(&record)?
        }
        Command::Descriptor { domain } => {
            let descriptor = DescriptorResolver::resolve(domain, &options).await?;
            toml::to_string_pretty(descriptor.as_table())?
        }
        Command::Lookup(args) => {
            let resolver = FederationResolver::new(&args.server, args.domain.as_deref(), &options)?;
            let kind = &args.kind;
            let record = match (&kind.name, &kind.id, &kind.txid) {
                (Some(name), _, _) => resolver.resolve_address(name).await?,
                (_, Some(id), _) => resolver.resolve_account_id(id).await?,
                (_, _, Some(txid)) => resolver.resolve_transaction_id(txid).await?,
                _ => anyhow::bail!("one of --name, --id or --txid is required"),
            };
            serde_json::to_string_pretty(&record)?
        }
        Command::Query(args) => {
            let server = EquatorServer::new(&args.server, &options)?;
            query::run(&server, args).await?
        }
    };

    println!("{output}");
    Ok(())
}
