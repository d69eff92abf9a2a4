use super::FixtureError;
use super::loader::TableWriter;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, PutRequest, WriteRequest};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// Maps a JSON value onto the DynamoDB attribute of the same shape.
pub fn json_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(json_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(to_item(map)),
    }
}

pub fn to_item(map: &Map<String, Value>) -> HashMap<String, AttributeValue> {
    map.iter()
        .map(|(k, v)| (k.clone(), json_to_attribute(v)))
        .collect()
}

/// [`TableWriter`] backed by `BatchWriteItem`.
pub struct DynamoTableWriter {
    client: Client,
}

impl DynamoTableWriter {
    /// Resolves credentials the usual AWS way. `endpoint` points the client at
    /// DynamoDB Local or another compatible store.
    pub async fn connect(region: &str, endpoint: Option<&str>) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
        if let Some(url) = endpoint {
            loader = loader.endpoint_url(url);
        }
        let config = loader.load().await;
        debug!("DynamoDB client ready for region {region}");
        Self {
            client: Client::new(&config),
        }
    }
}

#[async_trait]
impl TableWriter for DynamoTableWriter {
    async fn batch_write(
        &self,
        table: &str,
        items: &[Map<String, Value>],
    ) -> Result<usize, FixtureError> {
        let requests = items
            .iter()
            .map(|item| {
                let put = PutRequest::builder()
                    .set_item(Some(to_item(item)))
                    .build()
                    .map_err(|e| FixtureError::Store(e.to_string()))?;
                Ok(WriteRequest::builder().put_request(put).build())
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        let output = self
            .client
            .batch_write_item()
            .request_items(table, requests)
            .send()
            .await
            .map_err(|e| FixtureError::Store(DisplayErrorContext(&e).to_string()))?;

        let unprocessed = output
            .unprocessed_items()
            .map(|pending| pending.values().map(Vec::len).sum())
            .unwrap_or(0);
        Ok(unprocessed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_values_map_by_shape() {
        let value = json!({
            "id": "b1",
            "paymentAmount": 1200,
            "members": ["s1", "s2"],
            "teacherId": null,
            "meta": { "createdAt": "2025-01-01T00:00:00.000Z", "isHeavy": true }
        });
        let Value::Object(map) = value else { unreachable!() };
        let item = to_item(&map);

        assert_eq!(item["id"], AttributeValue::S("b1".into()));
        assert_eq!(item["paymentAmount"], AttributeValue::N("1200".into()));
        assert_eq!(item["teacherId"], AttributeValue::Null(true));
        assert_eq!(
            item["members"],
            AttributeValue::L(vec![
                AttributeValue::S("s1".into()),
                AttributeValue::S("s2".into())
            ])
        );
        let AttributeValue::M(meta) = &item["meta"] else {
            panic!("meta should be a map");
        };
        assert_eq!(meta["isHeavy"], AttributeValue::Bool(true));
    }

    #[test]
    fn floats_keep_their_text() {
        assert_eq!(json_to_attribute(&json!(0.5)), AttributeValue::N("0.5".into()));
    }
}
