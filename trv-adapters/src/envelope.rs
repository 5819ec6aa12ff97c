//! Context-broker envelope decoding
//!
//! The STH service wraps samples as
//! `contextResponses[0].contextElement.attributes[*].values[*]`, where each
//! value is `{ "attrValue": ..., "recvTime": "<RFC 3339>" }`. Only the first
//! context response is read.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use trv_core::{AttributeRecord, RemoteError, Series};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    context_responses: Vec<ContextResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContextResponse {
    context_element: ContextElement,
}

#[derive(Debug, Deserialize)]
struct ContextElement {
    attributes: Vec<Attribute>,
}

#[derive(Debug, Deserialize)]
struct Attribute {
    name: Option<String>,
    values: Vec<Sample>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Sample {
    attr_value: Value,
    recv_time: DateTime<Utc>,
}

/// Decode every sample of `R::ATTRIBUTE` from an envelope.
///
/// All or nothing: one bad sample rejects the whole body.
pub fn decode<R: AttributeRecord>(body: &Value) -> Result<Series<R>, RemoteError> {
    let envelope = Envelope::deserialize(body)
        .map_err(|e| RemoteError::UnexpectedEnvelope(e.to_string()))?;

    let element = envelope
        .context_responses
        .into_iter()
        .next()
        .ok_or_else(|| RemoteError::UnexpectedEnvelope("contextResponses is empty".to_string()))?
        .context_element;

    let attribute = select_attribute(element.attributes, R::ATTRIBUTE)?;

    attribute
        .values
        .into_iter()
        .enumerate()
        .map(|(index, sample)| {
            R::from_sample(&sample.attr_value, sample.recv_time)
                .map_err(|reason| RemoteError::InvalidSample { index, reason })
        })
        .collect::<Result<Vec<R>, _>>()
        .map(Series::new)
}

/// The attribute named `wanted`, or an unnamed first attribute
fn select_attribute(
    mut attributes: Vec<Attribute>,
    wanted: &str,
) -> Result<Attribute, RemoteError> {
    if let Some(pos) = attributes
        .iter()
        .position(|a| a.name.as_deref() == Some(wanted))
    {
        return Ok(attributes.swap_remove(pos));
    }

    match attributes.into_iter().next() {
        Some(first) if first.name.is_none() => Ok(first),
        Some(first) => Err(RemoteError::UnexpectedEnvelope(format!(
            "expected attribute {}, found {}",
            wanted,
            first.name.unwrap_or_default()
        ))),
        None => Err(RemoteError::UnexpectedEnvelope(
            "attributes is empty".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use trv_core::{LapRecord, LuminosityReading};

    fn lap_body(values: Value) -> Value {
        json!({
            "contextResponses": [{
                "contextElement": {
                    "attributes": [{ "name": "lap", "values": values }],
                    "id": "urn:ngsi-ld:TRV:027",
                    "isPattern": false,
                    "type": "TrackVision"
                },
                "statusCode": { "code": "200", "reasonPhrase": "OK" }
            }]
        })
    }

    #[test]
    fn test_decode_laps_in_arrival_order() {
        let body = lap_body(json!([
            { "attrValue": [4, 41234], "recvTime": "2024-10-10T18:20:31.123Z" },
            { "attrValue": [2, 39870], "recvTime": "2024-10-10T18:21:11.000Z" }
        ]));
        let series: Series<LapRecord> = decode(&body).unwrap();
        let laps: Vec<u32> = series.iter().map(|r| r.lap_number).collect();
        assert_eq!(laps, vec![4, 2]);
        assert_eq!(
            series.records()[0].received_at,
            "2024-10-10T18:20:31.123Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn test_decode_empty_values() {
        let series: Series<LapRecord> = decode(&lap_body(json!([]))).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_decode_missing_keys() {
        let err = decode::<LapRecord>(&json!({ "contextResponses": [] })).unwrap_err();
        assert!(matches!(err, RemoteError::UnexpectedEnvelope(_)));

        let err = decode::<LapRecord>(&json!({ "orion": "2.0" })).unwrap_err();
        assert!(matches!(err, RemoteError::UnexpectedEnvelope(_)));

        let err = decode::<LapRecord>(&lap_body(json!([{ "attrValue": [1, 2] }]))).unwrap_err();
        assert!(matches!(err, RemoteError::UnexpectedEnvelope(_)));
    }

    #[test]
    fn test_decode_rejects_whole_series_on_bad_sample() {
        let body = lap_body(json!([
            { "attrValue": [1, 500], "recvTime": "2024-10-10T18:20:31.123Z" },
            { "attrValue": 512, "recvTime": "2024-10-10T18:20:32.123Z" }
        ]));
        match decode::<LapRecord>(&body) {
            Err(RemoteError::InvalidSample { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected InvalidSample, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_selects_named_attribute() {
        let body = json!({
            "contextResponses": [{
                "contextElement": {
                    "attributes": [
                        { "name": "lap", "values": [] },
                        { "name": "luminosity", "values": [
                            { "attrValue": "512", "recvTime": "2024-10-10T18:20:31.123Z" }
                        ]}
                    ]
                }
            }]
        });
        let series: Series<LuminosityReading> = decode(&body).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.records()[0].value, 512.0);
    }

    #[test]
    fn test_decode_unnamed_attribute_falls_back_to_first() {
        let body = json!({
            "contextResponses": [{
                "contextElement": {
                    "attributes": [{ "values": [
                        { "attrValue": [1, 500], "recvTime": "2024-10-10T18:20:31.123Z" }
                    ]}]
                }
            }]
        });
        assert_eq!(decode::<LapRecord>(&body).unwrap().len(), 1);
    }

    #[test]
    fn test_decode_rejects_other_attribute() {
        let body = lap_body(json!([]));
        let err = decode::<LuminosityReading>(&body).unwrap_err();
        assert!(matches!(err, RemoteError::UnexpectedEnvelope(_)));
    }
}
