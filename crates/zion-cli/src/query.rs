//! `zion query`: build (and optionally execute) an Equator resource query.

use anyhow::Context;
use clap::{Args, Subcommand, ValueEnum};
use zion_equator::builders::Resource;
use zion_equator::{CallBuilder, EquatorServer, FilterPolicy, Order};

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Equator server base URL (may carry a path prefix)
    #[arg(long, env = "ZION_EQUATOR_URL", default_value = "https://equator.zion.org", global = true)]
    pub server: String,

    #[arg(long, global = true)]
    pub cursor: Option<String>,

    #[arg(long, global = true)]
    pub limit: Option<u32>,

    #[arg(long, value_enum, global = true)]
    pub order: Option<OrderArg>,

    /// Fail instead of using the last filter when several are given
    #[arg(long, global = true)]
    pub strict: bool,

    /// Send the request and print the JSON response instead of the URL
    #[arg(long, global = true)]
    pub execute: bool,

    #[command(subcommand)]
    pub resource: ResourceCmd,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for Order {
    fn from(o: OrderArg) -> Self {
        match o {
            OrderArg::Asc => Order::Asc,
            OrderArg::Desc => Order::Desc,
        }
    }
}

/// Filters are applied in flag order below; with the default policy the last
/// one applied decides the path.
#[derive(Subcommand, Debug)]
pub enum ResourceCmd {
    Accounts {
        #[arg(long)]
        account_id: Option<String>,
    },
    Effects {
        #[arg(long)]
        for_account: Option<String>,
        #[arg(long)]
        for_ledger: Option<u64>,
        #[arg(long)]
        for_transaction: Option<String>,
        #[arg(long)]
        for_operation: Option<u64>,
    },
    Ledgers {
        #[arg(long)]
        ledger: Option<u64>,
    },
    Payments {
        #[arg(long)]
        for_account: Option<String>,
        #[arg(long)]
        for_ledger: Option<u64>,
        #[arg(long)]
        for_transaction: Option<String>,
        #[arg(long)]
        include_failed: bool,
    },
    Transactions {
        #[arg(long)]
        transaction: Option<String>,
        #[arg(long)]
        for_account: Option<String>,
        #[arg(long)]
        for_ledger: Option<u64>,
        #[arg(long)]
        include_failed: bool,
    },
    Operations {
        #[arg(long)]
        operation: Option<u64>,
        #[arg(long)]
        for_account: Option<String>,
        #[arg(long)]
        for_ledger: Option<u64>,
        #[arg(long)]
        for_transaction: Option<String>,
        #[arg(long)]
        include_failed: bool,
    },
}

/// Apply `f` to the builder when `value` is present.
fn maybe<B, T>(b: B, value: Option<T>, f: impl FnOnce(B, T) -> B) -> B {
    match value {
        Some(v) => f(b, v),
        None => b,
    }
}

/// Run the query described by `args` against `server` and return what the
/// command prints: the URL, or the pretty-printed response with `--execute`.
pub async fn run(server: &EquatorServer, args: &QueryArgs) -> anyhow::Result<String> {
    match &args.resource {
        ResourceCmd::Accounts { account_id } => {
            let b = maybe(server.accounts(), account_id.as_deref(), |b, id| b.account_id(id));
            finish(b, args).await
        }
        ResourceCmd::Effects { for_account, for_ledger, for_transaction, for_operation } => {
            let b = server.effects();
            let b = maybe(b, for_account.as_deref(), |b, id| b.for_account(id));
            let b = maybe(b, *for_ledger, |b, seq| b.for_ledger(seq));
            let b = maybe(b, for_transaction.as_deref(), |b, tx| b.for_transaction(tx));
            let b = maybe(b, *for_operation, |b, op| b.for_operation(op));
            finish(b, args).await
        }
        ResourceCmd::Ledgers { ledger } => {
            let b = maybe(server.ledgers(), *ledger, |b, seq| b.ledger(seq));
            finish(b, args).await
        }
        ResourceCmd::Payments { for_account, for_ledger, for_transaction, include_failed } => {
            let b = server.payments();
            let b = maybe(b, for_account.as_deref(), |b, id| b.for_account(id));
            let b = maybe(b, *for_ledger, |b, seq| b.for_ledger(seq));
            let b = maybe(b, for_transaction.as_deref(), |b, tx| b.for_transaction(tx));
            let b = if *include_failed { b.include_failed(true) } else { b };
            finish(b, args).await
        }
        ResourceCmd::Transactions { transaction, for_account, for_ledger, include_failed } => {
            let b = server.transactions();
            let b = maybe(b, transaction.as_deref(), |b, tx| b.transaction(tx));
            let b = maybe(b, for_account.as_deref(), |b, id| b.for_account(id));
            let b = maybe(b, *for_ledger, |b, seq| b.for_ledger(seq));
            let b = if *include_failed { b.include_failed(true) } else { b };
            finish(b, args).await
        }
        ResourceCmd::Operations { operation, for_account, for_ledger, for_transaction, include_failed } => {
            let b = server.operations();
            let b = maybe(b, *operation, |b, op| b.operation(op));
            let b = maybe(b, for_account.as_deref(), |b, id| b.for_account(id));
            let b = maybe(b, *for_ledger, |b, seq| b.for_ledger(seq));
            let b = maybe(b, for_transaction.as_deref(), |b, tx| b.for_transaction(tx));
            let b = if *include_failed { b.include_failed(true) } else { b };
            finish(b, args).await
        }
    }
}

async fn finish<R: Resource>(b: CallBuilder<R>, args: &QueryArgs) -> anyhow::Result<String> {
    let b = maybe(b, args.cursor.clone(), |b, c| b.cursor(c));
    let b = maybe(b, args.limit, |b, n| b.limit(n));
    let b = maybe(b, args.order, |b, o| b.order(o.into()));
    let b = if args.strict { b.filter_policy(FilterPolicy::Strict) } else { b };

    if !args.execute {
        return Ok(b.url()?.to_string());
    }

    let url = b.url()?;
    let body: serde_json::Value = b.call().await.with_context(|| format!("GET {url}"))?;
    Ok(serde_json::to_string_pretty(&body)?)
}
