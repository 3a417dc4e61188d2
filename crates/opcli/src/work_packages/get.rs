use crate::client::OpenProjectClient;
use crate::prelude::*;

/// Options for getting a work package
#[derive(Debug, clap::Args, Clone)]
pub struct GetOptions {
    /// Work package ID
    #[arg(long)]
    pub id: u64,
}

/// Handle the get-work-package command
pub async fn handler(options: GetOptions, global: crate::Global) -> Result<()> {
    let client = OpenProjectClient::from_env()?;
    let work_package = client.work_package(options.id).await?;

    super::display_work_package(&work_package);
    print_debug_json(&work_package, global.debug_json)
}
