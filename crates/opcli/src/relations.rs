use colored::Colorize;
use reqwest::Method;

use opcli_core::display::truncate;
use opcli_core::fallback::{more_specific, NOT_FOUND_OR_NOT_ALLOWED};
use opcli_core::models::{from_value, Relation};
use opcli_core::pagination::ensure_limit;
use opcli_core::work_package::{involved_filter, relation_payload, RelationType};

use crate::client::OpenProjectClient;
use crate::prelude::{println, *};

/// Options for listing the relations of a work package
#[derive(Debug, clap::Args, Clone)]
pub struct ListRelationsOptions {
    /// Work package ID
    #[arg(long)]
    pub id: u64,

    /// Maximum number of relations to fetch
    #[arg(long, default_value_t = 100, allow_negative_numbers = true)]
    pub limit: i64,
}

/// Options for creating a relation
#[derive(Debug, clap::Args, Clone)]
pub struct CreateRelationOptions {
    /// Source work package ID
    #[arg(long)]
    pub from_id: u64,

    /// Target work package ID
    #[arg(long)]
    pub to_id: u64,

    /// Relation type (for example: relates, blocks, follows)
    #[arg(long = "type")]
    pub relation_type: String,

    /// Optional relation description
    #[arg(long)]
    pub description: Option<String>,

    /// Optional lag, typically in days
    #[arg(long, allow_negative_numbers = true)]
    pub lag: Option<i64>,
}

/// Relations touching `id`, via the work package endpoint or the global one.
pub async fn list_relations_data(
    client: &OpenProjectClient,
    id: u64,
    limit: usize,
) -> Result<Vec<Relation>> {
    let primary = match client
        .collect_as::<Relation>(&f!("/work_packages/{id}/relations"), &[], limit)
        .await
    {
        Ok(relations) => return Ok(relations),
        Err(err) if err.has_status(NOT_FOUND_OR_NOT_ALLOWED) => err,
        Err(err) => return Err(err.into()),
    };

    log::debug!("work package relations unavailable ({primary}), using /relations");
    let params = vec![("filters".to_string(), involved_filter(id))];
    client
        .collect_as::<Relation>("/relations", &params, limit)
        .await
        .map_err(|secondary| more_specific(primary, secondary).into())
}

pub async fn create_relation_data(
    client: &OpenProjectClient,
    options: &CreateRelationOptions,
) -> Result<Relation> {
    // Validated before any request goes out.
    let kind: RelationType = options.relation_type.parse()?;
    let payload = relation_payload(kind, options.to_id, options.description.as_deref(), options.lag)?;

    let created = client
        .request(
            Method::POST,
            &f!("/work_packages/{}/relations", options.from_id),
            &[],
            Some(&payload),
            &[200, 201],
        )
        .await?;

    Ok(from_value(created)?)
}

fn print_relations(relations: &[Relation]) {
    if relations.is_empty() {
        println!("No relations returned.");
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::row![
        "ID".bold().cyan(),
        "Type".bold().cyan(),
        "From".bold().cyan(),
        "To".bold().cyan(),
        "Lag".bold().cyan()
    ]);
    for relation in relations {
        table.add_row(prettytable::row![
            relation.id.map(|id| id.to_string()).unwrap_or_else(|| "?".into()),
            truncate(relation.relation_type.as_deref().unwrap_or("-"), 10).yellow(),
            truncate(&relation.links.title_or("from", "-"), 13),
            truncate(&relation.links.title_or("to", "-"), 13),
            relation.lag.map(|lag| lag.to_string()).unwrap_or_else(|| "-".into())
        ]);
    }
    table.printstd();
}

pub async fn list_handler(options: ListRelationsOptions, global: crate::Global) -> Result<()> {
    let limit = ensure_limit(options.limit)?;
    let client = OpenProjectClient::from_env()?;
    let relations = list_relations_data(&client, options.id, limit).await?;

    println!("Work package #{}", options.id);
    print_relations(&relations);
    print_debug_json(&relations, global.debug_json)
}

pub async fn create_handler(options: CreateRelationOptions, global: crate::Global) -> Result<()> {
    let client = OpenProjectClient::from_env()?;
    let relation = create_relation_data(&client, &options).await?;

    let relation_type = relation
        .relation_type
        .clone()
        .unwrap_or_else(|| options.relation_type.clone());
    println!(
        "Created relation #{}: #{} {} #{}.",
        relation.id.map(|id| id.to_string()).unwrap_or_else(|| "?".into()),
        options.from_id,
        relation_type,
        options.to_id
    );
    print_debug_json(&relation, global.debug_json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{client_for, collection};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn options(relation_type: &str, lag: Option<i64>) -> CreateRelationOptions {
        CreateRelationOptions {
            from_id: 10,
            to_id: 11,
            relation_type: relation_type.to_string(),
            description: None,
            lag,
        }
    }

    #[tokio::test]
    async fn test_list_relations_falls_back_to_global_endpoint() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/work_packages/5/relations"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v3/relations"))
            .and(query_param(
                "filters",
                r#"[{"involved":{"operator":"=","values":["5"]}}]"#,
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(collection(
                vec![json!({ "id": 70, "type": "blocks", "lag": 0 })],
                false,
            )))
            .expect(1)
            .mount(&server)
            .await;

        // Act
        let relations = list_relations_data(&client_for(&server.uri()), 5, 100)
            .await
            .unwrap();

        // Assert
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].relation_type.as_deref(), Some("blocks"));
    }

    #[tokio::test]
    async fn test_list_relations_reports_more_specific_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/work_packages/5/relations"))
            .respond_with(ResponseTemplate::new(405))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v3/relations"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "message": "Bad filter." })))
            .mount(&server)
            .await;

        let err = list_relations_data(&client_for(&server.uri()), 5, 100)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "OpenProject API error 400 for GET /relations: Bad filter."
        );
    }

    #[tokio::test]
    async fn test_list_relations_does_not_fall_back_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/work_packages/5/relations"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v3/relations"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = list_relations_data(&client_for(&server.uri()), 5, 100)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("error 500"));
    }

    #[tokio::test]
    async fn test_create_relation_posts_normalized_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v3/work_packages/10/relations"))
            .and(body_json(json!({
                "type": "blocks",
                "lag": 2,
                "_links": { "to": { "href": "/api/v3/work_packages/11" } }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 90, "type": "blocks" })))
            .expect(1)
            .mount(&server)
            .await;

        let relation = create_relation_data(&client_for(&server.uri()), &options(" Blocks ", Some(2)))
            .await
            .unwrap();

        assert_eq!(relation.id, Some(90));
    }

    #[tokio::test]
    async fn test_create_relation_validates_before_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;
        let client = client_for(&server.uri());

        let unknown = create_relation_data(&client, &options("causes", None))
            .await
            .unwrap_err();
        let negative_lag = create_relation_data(&client, &options("follows", Some(-1)))
            .await
            .unwrap_err();

        assert!(unknown
            .to_string()
            .starts_with("Unsupported relation type 'causes'. Allowed types: blocked, blocks"));
        assert_eq!(negative_lag.to_string(), "--lag must be zero or greater.");
    }
}
