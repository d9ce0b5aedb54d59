use anyhow::Result;
use httpmock::prelude::*;
use rating_monitor::domain::model::{DirectionId, UniversityId};
use rating_monitor::domain::ports::UniversityRepository;
use rating_monitor::utils::validation::Validate;
use rating_monitor::{
    AggregationError, AppConfig, DirectionService, HttpRatingSource, InMemoryStore, ServiceError,
};
use std::sync::Arc;
use tempfile::TempDir;

const SNILS: &str = "112-233-445 95";

fn list_with_applicant(position: usize) -> serde_json::Value {
    let mut applicants: Vec<serde_json::Value> = (0..position - 1)
        .map(|i| {
            serde_json::json!({
                "national_id": format!("000-000-{:03} 00", i + 1),
                "score": 300 - i,
                "priority": 1,
                "consent": i % 2 == 0
            })
        })
        .collect();
    applicants.push(serde_json::json!({
        "national_id": SNILS,
        "score": 250,
        "priority": 2,
        "consent": true
    }));
    serde_json::json!({ "budget_places": 15, "applicants": applicants })
}

fn write_config(dir: &TempDir, base_url: &str) -> Result<std::path::PathBuf> {
    let content = format!(
        r#"
[source]
timeout_seconds = 5

[resolver]
max_in_flight = 2

[user]
id = 1
national_id = "{snils}"
directions = [3, 2, 1]

[[universities]]
id = 20
name = "SPbU"
full_name = "Saint Petersburg State University"

[[universities]]
id = 10
name = "ITMO"
full_name = "ITMO University"

[[directions]]
id = 1
name = "Software Engineering"
university_id = 10
url = "{base}/A"

[[directions]]
id = 2
name = "Information Security"
university_id = 10
url = "{base}/B"

[[directions]]
id = 3
name = "Mathematics"
university_id = 20
url = "{base}/C"
"#,
        snils = SNILS,
        base = base_url
    );

    let path = dir.path().join("rating.toml");
    std::fs::write(&path, content)?;
    Ok(path)
}

async fn build_service(
    config: &AppConfig,
) -> Result<(
    Arc<InMemoryStore>,
    DirectionService<InMemoryStore, InMemoryStore, InMemoryStore>,
)> {
    let store = Arc::new(InMemoryStore::new());
    config.seed_store(&store).await?;
    let source = HttpRatingSource::from_config(&config.source)?;
    let service = DirectionService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(source),
        config.engine_config(),
    );
    Ok((store, service))
}

#[tokio::test]
async fn test_end_to_end_grouped_rating() -> Result<()> {
    let server = MockServer::start_async().await;
    let a = server
        .mock_async(|when, then| {
            when.method(GET).path("/A");
            then.status(200).json_body(list_with_applicant(5));
        })
        .await;
    let b = server
        .mock_async(|when, then| {
            when.method(GET).path("/B");
            then.status(200)
                .json_body(serde_json::json!({"budget_places": 10, "applicants": []}));
        })
        .await;
    let c = server
        .mock_async(|when, then| {
            when.method(GET).path("/C");
            then.status(200).json_body(list_with_applicant(1));
        })
        .await;

    let temp_dir = TempDir::new()?;
    let config = AppConfig::from_file(write_config(&temp_dir, &server.base_url())?)?;
    config.validate()?;
    let (store, service) = build_service(&config).await?;

    service.set_for_user(1, &config.selected_directions()).await?;
    let result = service.get_for_user_with_rating(1).await?;

    a.assert_async().await;
    b.assert_async().await;
    c.assert_async().await;

    assert_eq!(result.groups.len(), 2);
    assert_eq!(result.groups[0].university_id, UniversityId(10));
    assert_eq!(result.groups[0].university_name, "ITMO");
    assert_eq!(result.groups[1].university_id, UniversityId(20));

    let itmo = &result.groups[0].directions;
    assert_eq!(itmo.iter().map(|d| d.id.0).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(itmo[0].position, 5);
    assert_eq!(itmo[0].priority_one_upper, 4);
    assert_eq!(itmo[0].submitted_consent_upper, 2);
    assert_eq!(itmo[0].budget_places, 15);
    assert!(!itmo[1].listed);
    assert_eq!(itmo[1].position + itmo[1].score + itmo[1].budget_places, 0);

    assert_eq!(result.groups[1].directions[0].position, 1);

    let mut universities: Vec<u32> = UniversityRepository::get_for_user(store.as_ref(), 1)
        .await?
        .into_iter()
        .map(|u| u.id.0)
        .collect();
    universities.sort();
    assert_eq!(universities, vec![10, 20]);

    let json = serde_json::to_value(&result)?;
    assert!(json.is_array());
    assert_eq!(json[0]["directions"][1]["position"], 0);
    Ok(())
}

#[tokio::test]
async fn test_end_to_end_failure_returns_no_result() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/A");
            then.status(200).json_body(list_with_applicant(5));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/B");
            then.status(200)
                .json_body(serde_json::json!({"budget_places": 10, "applicants": []}));
        })
        .await;
    let c = server
        .mock_async(|when, then| {
            when.method(GET).path("/C");
            then.status(504);
        })
        .await;

    let temp_dir = TempDir::new()?;
    let config = AppConfig::from_file(write_config(&temp_dir, &server.base_url())?)?;
    let (_store, service) = build_service(&config).await?;
    service.set_for_user(1, &config.selected_directions()).await?;

    let result = service.get_for_user_with_rating(1).await;

    c.assert_async().await;
    match result {
        Err(ServiceError::Aggregation(AggregationError::Source { direction_id, .. })) => {
            assert_eq!(direction_id, DirectionId(3));
        }
        other => panic!("expected aggregation failure, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_directions_listing_is_grouped() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = AppConfig::from_file(write_config(&temp_dir, "http://127.0.0.1:9")?)?;
    let (_store, service) = build_service(&config).await?;

    let all = service.get_all().await?;
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].university_id, UniversityId(10));
    assert_eq!(all[0].directions.len(), 2);

    service.set_for_user(1, &[DirectionId(3)]).await?;
    let mine = service.get_for_user(1).await?;
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].university_name, "SPbU");

    let direction = service.get_by_id(DirectionId(2)).await?;
    assert_eq!(direction.name, "Information Security");

    assert!(matches!(
        service.get_by_id(DirectionId(42)).await,
        Err(ServiceError::Repository(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_user_without_directions_gets_empty_result() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = AppConfig::from_file(write_config(&temp_dir, "http://127.0.0.1:9")?)?;
    let (_store, service) = build_service(&config).await?;

    let result = service.get_for_user_with_rating(1).await?;
    assert!(result.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unknown_user_is_repository_error() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = AppConfig::from_file(write_config(&temp_dir, "http://127.0.0.1:9")?)?;
    let (_store, service) = build_service(&config).await?;

    service.set_for_user(5, &[DirectionId(1)]).await?;
    let result = service.get_for_user_with_rating(5).await;
    assert!(matches!(result, Err(ServiceError::Repository(_))));
    Ok(())
}
