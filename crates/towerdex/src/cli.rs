//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use towerdex_catalog::{CardType, FeatureStatus, GearType, ReportType, Tier};

use crate::output::OutputMode;
use crate::screens::{
    BoosterFilters, CardFilters, ChipFilters, FeatureFilters, ReportFilters, TurretFilters,
};

/// Browse and curate the tower-defense game catalog.
#[derive(Debug, Parser)]
#[command(name = "towerdex", version, about)]
pub struct Cli {
    /// Config file (defaults to $TOWERDEX_CONFIG)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputMode>,

    /// Write output to a file instead of stdout
    #[arg(long, global = true, value_name = "PATH")]
    pub out_file: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List upgrade cards
    Cards(CardsArgs),

    /// List gear chips
    Chips(ChipsArgs),

    /// List turrets
    Turrets(TurretsArgs),

    /// List server boosters
    Boosters(BoostersArgs),

    /// List reports (all users' reports need an admin operator)
    Reports(ReportsArgs),

    /// List upcoming features by votes
    Features(FeaturesArgs),

    /// Submit a report
    Report(SubmitReportArgs),

    /// Add a booster to the roster
    AddBooster(AddBoosterArgs),

    /// Upvote a feature suggestion or a report
    Upvote(UpvoteArgs),

    /// Search a screen interactively, one line of search text per line of input
    Browse(BrowseArgs),

    /// Send a request to the read-only turret API
    Api(ApiArgs),
}

#[derive(Debug, Clone, Args)]
pub struct CardsArgs {
    /// Only cards for this tower (repeatable)
    #[arg(long = "tower", value_name = "TOWER")]
    pub towers: Vec<String>,

    /// Card type: Normal, Chain, Combo or Elite
    #[arg(long = "type")]
    pub card_type: Option<CardType>,

    /// Tier: T1, T2 or T3
    #[arg(long)]
    pub tier: Option<Tier>,

    /// Search names and descriptions
    #[arg(short, long)]
    pub search: Option<String>,

    /// Group the listing by tier
    #[arg(long)]
    pub group: bool,
}

impl From<CardsArgs> for CardFilters {
    fn from(args: CardsArgs) -> Self {
        CardFilters {
            towers: args.towers,
            card_type: args.card_type,
            tier: args.tier,
            search: args.search,
            group_by_tier: args.group,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ChipsArgs {
    /// Compatible gear, e.g. Weapon or "Energy Core"
    #[arg(long)]
    pub gear: Option<GearType>,

    /// Only chips affecting this tower
    #[arg(long)]
    pub tower: Option<String>,

    /// Only chips affecting a tower of this type (repeatable)
    #[arg(long = "tower-type", value_name = "TYPE")]
    pub tower_types: Vec<String>,

    /// Boost type, e.g. "Tower DMG"
    #[arg(long)]
    pub boost: Option<String>,

    #[arg(short, long)]
    pub search: Option<String>,
}

impl From<ChipsArgs> for ChipFilters {
    fn from(args: ChipsArgs) -> Self {
        ChipFilters {
            gear: args.gear,
            tower: args.tower,
            tower_types: args.tower_types,
            boost_type: args.boost,
            search: args.search,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct TurretsArgs {
    /// Turret type, e.g. Energy
    #[arg(long = "type")]
    pub kind: Option<String>,

    #[arg(long)]
    pub tier: Option<Tier>,

    #[arg(short, long)]
    pub search: Option<String>,
}

impl From<TurretsArgs> for TurretFilters {
    fn from(args: TurretsArgs) -> Self {
        TurretFilters {
            kind: args.kind,
            tier: args.tier,
            search: args.search,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct BoostersArgs {
    /// Search discord name, nickname and game id
    #[arg(short, long)]
    pub search: Option<String>,

    /// Include inactive boosters
    #[arg(long)]
    pub all: bool,

    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

impl From<BoostersArgs> for BoosterFilters {
    fn from(args: BoostersArgs) -> Self {
        BoosterFilters {
            search: args.search,
            include_inactive: args.all,
            page: args.page,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ReportsArgs {
    /// Only the operator's own reports
    #[arg(long)]
    pub mine: bool,

    /// Report type
    #[arg(long = "type")]
    pub kind: Option<ReportType>,

    #[arg(short, long)]
    pub search: Option<String>,
}

impl From<ReportsArgs> for ReportFilters {
    fn from(args: ReportsArgs) -> Self {
        ReportFilters {
            kind: args.kind,
            search: args.search,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct FeaturesArgs {
    #[arg(long)]
    pub status: Option<FeatureStatus>,
}

impl From<FeaturesArgs> for FeatureFilters {
    fn from(args: FeaturesArgs) -> Self {
        FeatureFilters {
            status: args.status,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct SubmitReportArgs {
    /// Title, 3 to 100 characters
    pub title: String,

    /// Description, 10 to 1000 characters
    pub description: String,

    #[arg(long = "type", default_value = "suggestions")]
    pub kind: ReportType,
}

#[derive(Debug, Clone, Args)]
pub struct AddBoosterArgs {
    pub discord_name: String,

    /// In-game player id
    pub game_id: String,

    #[arg(long)]
    pub nickname: Option<String>,

    /// Add the booster as inactive
    #[arg(long)]
    pub inactive: bool,
}

#[derive(Debug, Clone, Args)]
pub struct UpvoteArgs {
    /// Feature suggestion id, or report id with --report
    pub id: String,

    #[arg(long)]
    pub report: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Screen {
    Cards,
    Chips,
    Turrets,
    Boosters,
}

#[derive(Debug, Clone, Args)]
pub struct BrowseArgs {
    #[arg(value_enum)]
    pub screen: Screen,
}

#[derive(Debug, Clone, Args)]
pub struct ApiArgs {
    /// Request path with query, e.g. "/api/turret?name=Hive"
    pub target: String,

    #[arg(long, default_value = "GET")]
    pub method: String,
}
