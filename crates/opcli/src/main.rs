use std::process::ExitCode;

use crate::prelude::*;
use crate::prelude::eprintln;
use clap::Parser;

mod catalog;
mod client;
mod error;
mod files;
mod prelude;
mod projects;
mod relations;
mod reports;
mod resolve;
mod wiki;
mod work_packages;

#[derive(Debug, clap::Parser)]
#[command(
    name = "opcli",
    author,
    version,
    about = "OpenProject project-management and knowledge CLI",
    long_about = "Work with OpenProject work packages, relations and wiki pages from the terminal, \
                  and keep weekly status summaries and decision logs as local markdown."
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Print raw JSON payloads (pretty, sorted keys) after the normal output
    #[clap(long, global = true, default_value = "false")]
    pub debug_json: bool,
}

#[derive(Debug, clap::Subcommand)]
#[command(rename_all = "kebab-case")]
pub enum SubCommands {
    /// List visible projects
    ListProjects,

    /// List work packages of a project
    ListWorkPackages(work_packages::list::ListOptions),

    /// Create a work package
    CreateWorkPackage(work_packages::create::CreateOptions),

    /// Move a work package to another status
    UpdateWorkPackageStatus(work_packages::update::UpdateStatusOptions),

    /// Comment on a work package
    AddComment(work_packages::comment::CommentOptions),

    /// Show one work package
    GetWorkPackage(work_packages::get::GetOptions),

    /// Update fields of a work package
    UpdateWorkPackage(work_packages::update::UpdateOptions),

    /// List statuses
    ListStatuses,

    /// List work package types, globally or for a project
    ListTypes(catalog::ListTypesOptions),

    /// List priorities
    ListPriorities,

    /// List users
    ListUsers(catalog::ListUsersOptions),

    /// List relations of a work package
    ListRelations(relations::ListRelationsOptions),

    /// Relate two work packages
    CreateRelation(relations::CreateRelationOptions),

    /// List wiki pages of a project
    ListWikiPages(wiki::list::ListOptions),

    /// Read a wiki page by id or by title
    ReadWikiPage(wiki::read::ReadOptions),

    /// Create or replace a wiki page
    WriteWikiPage(wiki::write::WriteOptions),

    /// Generate the weekly status summary
    WeeklySummary(reports::WeeklySummaryOptions),

    /// Write a decision log entry
    LogDecision(reports::LogDecisionOptions),
}

async fn run(app: App) -> Result<()> {
    let global = app.global;

    match app.command {
        SubCommands::ListProjects => projects::handler(global).await,
        SubCommands::ListWorkPackages(options) => work_packages::list::handler(options, global).await,
        SubCommands::CreateWorkPackage(options) => {
            work_packages::create::handler(options, global).await
        }
        SubCommands::UpdateWorkPackageStatus(options) => {
            work_packages::update::status_handler(options, global).await
        }
        SubCommands::AddComment(options) => work_packages::comment::handler(options, global).await,
        SubCommands::GetWorkPackage(options) => work_packages::get::handler(options, global).await,
        SubCommands::UpdateWorkPackage(options) => {
            work_packages::update::handler(options, global).await
        }
        SubCommands::ListStatuses => catalog::statuses_handler(global).await,
        SubCommands::ListTypes(options) => catalog::types_handler(options, global).await,
        SubCommands::ListPriorities => catalog::priorities_handler(global).await,
        SubCommands::ListUsers(options) => catalog::users_handler(options, global).await,
        SubCommands::ListRelations(options) => relations::list_handler(options, global).await,
        SubCommands::CreateRelation(options) => relations::create_handler(options, global).await,
        SubCommands::ListWikiPages(options) => wiki::list::handler(options, global).await,
        SubCommands::ReadWikiPage(options) => wiki::read::handler(options, global).await,
        SubCommands::WriteWikiPage(options) => wiki::write::handler(options, global).await,
        SubCommands::WeeklySummary(options) => reports::weekly_handler(options, global).await,
        SubCommands::LogDecision(options) => reports::decision_handler(options, global).await,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();
    env_logger::init();
    if let Err(err) = color_eyre::install() {
        eprintln!("Error: {err}");
        return ExitCode::FAILURE;
    }

    let app = App::parse();

    tokio::select! {
        result = run(app) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("Error: {err}");
                ExitCode::FAILURE
            }
        },
        Ok(()) = tokio::signal::ctrl_c() => {
            eprintln!("Error: Interrupted.");
            ExitCode::from(130)
        }
    }
}
