use reqwest::Method;
use serde_json::Value;

use opcli_core::fallback::COMMENT_REJECTIONS;
use opcli_core::work_package::{plan_comment_attempts, COMMENT_UNAVAILABLE};
use opcli_core::Error as ApiError;

use crate::client::OpenProjectClient;
use crate::prelude::{println, *};

/// Options for commenting on a work package
#[derive(Debug, clap::Args, Clone)]
pub struct CommentOptions {
    /// Work package ID
    #[arg(long)]
    pub id: u64,

    /// Comment text
    #[arg(long)]
    pub comment: String,
}

/// Attach `comment` to work package `id`, trying each strategy the server may support.
///
/// A strategy is abandoned only on a status in [`COMMENT_REJECTIONS`]; any
/// other failure is returned as is.
pub async fn add_comment_data(client: &OpenProjectClient, id: u64, comment: &str) -> Result<Value> {
    let wp = client.work_package(id).await?;
    let attempts = plan_comment_attempts(&wp, id, comment);
    let last = attempts.len().saturating_sub(1);

    for (index, attempt) in attempts.into_iter().enumerate() {
        let method = Method::from_bytes(attempt.method.as_bytes())?;
        let outcome = client
            .request(method, &attempt.path, &[], Some(&attempt.body), attempt.expected)
            .await;

        match outcome {
            Ok(result) => return Ok(result),
            Err(err) if index == last => {
                return Err(ApiError::Rejected {
                    context: COMMENT_UNAVAILABLE.to_string(),
                    source: Box::new(err),
                }
                .into())
            }
            Err(err) if err.has_status(COMMENT_REJECTIONS) => {
                log::debug!("{} {} declined the comment: {err}", attempt.method, attempt.path);
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(eyre!(COMMENT_UNAVAILABLE))
}

/// Handle the add-comment command
pub async fn handler(options: CommentOptions, global: crate::Global) -> Result<()> {
    let client = OpenProjectClient::from_env()?;
    let result = add_comment_data(&client, options.id, &options.comment).await?;

    println!("Added comment to work package #{}.", options.id);
    print_debug_json(&result, global.debug_json)
}
