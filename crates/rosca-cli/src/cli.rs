use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rosca_types::{Amount, CommitteeId, DrawId, MemberId, MonthYear, PayerId, PaymentId, ShareType};

#[derive(Parser)]
#[command(
    name = "rosca",
    about = "Rotating savings committee ledger",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Ledger state file (overrides the config file)
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    /// TOML config file; `rosca.toml` in the working directory is used if present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// One line typed into `rosca shell`.
#[derive(Parser)]
#[command(name = "rosca", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create, edit, delete or list committees
    Committee(CommitteeArgs),
    /// Create, edit, delete or list members
    Member(MemberArgs),
    /// Record, edit or delete monthly payments
    Payment(PaymentArgs),
    /// Record, edit or delete draws
    Draw(DrawArgs),
    /// Show the payment grid of a committee
    Grid(CommitteeRef),
    /// Show months paid and demerits per payer
    Standings(CommitteeRef),
    /// Check the stored ledger against its invariants
    Verify(VerifyArgs),
    /// Read commands from stdin against one ledger session
    Shell(ShellArgs),
    /// Revert the last change made in this session
    Undo(UndoArgs),
}

#[derive(Args)]
pub struct CommitteeArgs {
    #[command(subcommand)]
    pub action: CommitteeAction,
}

#[derive(Subcommand)]
pub enum CommitteeAction {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        monthly_amount: Amount,
        #[arg(long)]
        start_date: NaiveDate,
        #[arg(long)]
        allow_half_share: bool,
    },
    Update {
        id: CommitteeId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        monthly_amount: Option<Amount>,
        #[arg(long)]
        start_date: Option<NaiveDate>,
        #[arg(long)]
        allow_half_share: Option<bool>,
    },
    Delete {
        id: CommitteeId,
    },
    List,
}

#[derive(Args)]
pub struct MemberArgs {
    #[command(subcommand)]
    pub action: MemberAction,
}

#[derive(Subcommand)]
pub enum MemberAction {
    Add {
        committee: CommitteeId,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "full")]
        share: ShareType,
        /// Unpaired half-share member to pair with
        #[arg(long)]
        partner: Option<MemberId>,
    },
    Update {
        id: MemberId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        share: Option<ShareType>,
        #[arg(long, conflicts_with = "unpair")]
        partner: Option<MemberId>,
        /// Dissolve the current pairing
        #[arg(long)]
        unpair: bool,
    },
    Delete {
        id: MemberId,
    },
    List {
        committee: CommitteeId,
    },
}

#[derive(Args)]
pub struct PaymentArgs {
    #[command(subcommand)]
    pub action: PaymentAction,
}

#[derive(Subcommand)]
pub enum PaymentAction {
    Add {
        committee: CommitteeId,
        /// Member id of a full share, or pair id of a half-share pair
        #[arg(long)]
        payer: PayerId,
        #[arg(long)]
        month: MonthYear,
        /// Defaults to the committee's monthly amount
        #[arg(long)]
        amount: Option<Amount>,
        #[arg(long)]
        paid: NaiveDate,
    },
    Update {
        id: PaymentId,
        #[arg(long)]
        payer: Option<PayerId>,
        #[arg(long)]
        month: Option<MonthYear>,
        #[arg(long)]
        amount: Option<Amount>,
        #[arg(long)]
        paid: Option<NaiveDate>,
    },
    Delete {
        id: PaymentId,
    },
}

#[derive(Args)]
pub struct DrawArgs {
    #[command(subcommand)]
    pub action: DrawAction,
}

#[derive(Subcommand)]
pub enum DrawAction {
    Add {
        committee: CommitteeId,
        #[arg(long)]
        winner: PayerId,
        /// Defaults to the next undrawn month
        #[arg(long)]
        month: Option<MonthYear>,
        #[arg(long)]
        payout_date: NaiveDate,
    },
    Update {
        id: DrawId,
        #[arg(long)]
        winner: Option<PayerId>,
        #[arg(long)]
        month: Option<MonthYear>,
        #[arg(long)]
        payout_date: Option<NaiveDate>,
    },
    Delete {
        id: DrawId,
    },
    /// List payers who have not won yet
    Eligible {
        committee: CommitteeId,
    },
}

#[derive(Args)]
pub struct CommitteeRef {
    pub committee: CommitteeId,
}

#[derive(Args)]
pub struct VerifyArgs {}
#[derive(Args)]
pub struct ShellArgs {}
#[derive(Args)]
pub struct UndoArgs {}
