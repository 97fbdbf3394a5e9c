use anyhow::Context;

use crate::analyzers::types::CityDataset;

/// Object key the map frontend reads the dataset from.
pub const DATASET_KEY: &str = "data/cities_final.json";

/// Uploads the aggregated dataset to `bucket` as `application/json`.
#[tracing::instrument(skip(client, dataset), fields(cities = dataset.cities.len()))]
pub async fn publish_dataset(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    dataset: &CityDataset,
) -> anyhow::Result<()> {
    let body = serde_json::to_vec_pretty(dataset)?;

    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(body.into())
        .content_type("application/json")
        .cache_control("max-age=300")
        .send()
        .await
        .with_context(|| format!("uploading s3://{}/{}", bucket, key))?;

    tracing::info!(bucket, key, "Dataset published");
    Ok(())
}
