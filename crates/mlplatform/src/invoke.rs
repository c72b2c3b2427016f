use serde::{Deserialize, Serialize};

use crate::endpoint::EndpointHandle;
use crate::error::PlatformError;

#[derive(Serialize)]
struct InvokeRequest<'a> {
    inputs: &'a str,
}

/// One ranked entry of the raw endpoint response.
#[derive(Clone, Debug, Deserialize)]
pub struct RawPrediction {
    pub label: String,
    pub score: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prediction {
    pub label: u8,
    pub score: f64,
}

/// Parse the `LABEL_<n>` token the served model emits back into the integer
/// class. Only the binary class set {0,1} is valid here.
pub fn parse_label(label: &str) -> Result<u8, PlatformError> {
    let suffix = label
        .strip_prefix("LABEL_")
        .ok_or_else(|| PlatformError::LabelParse(label.to_string()))?;
    let n: u8 = suffix
        .parse()
        .map_err(|_| PlatformError::LabelParse(label.to_string()))?;
    if n > 1 {
        return Err(PlatformError::LabelParse(label.to_string()));
    }
    Ok(n)
}

fn top_prediction(raw: Vec<RawPrediction>) -> Result<Prediction, PlatformError> {
    let first = raw
        .into_iter()
        .next()
        .ok_or_else(|| PlatformError::BadResponse("empty prediction list".to_string()))?;

    if !(0.0..=1.0).contains(&first.score) {
        return Err(PlatformError::BadResponse(format!(
            "score {} outside [0,1]",
            first.score
        )));
    }

    Ok(Prediction { label: parse_label(&first.label)?, score: first.score })
}

pub struct InvokeClient {
    runtime_url: String,
    client: reqwest::Client,
}

impl InvokeClient {
    pub fn new(runtime_url: String) -> Self {
        Self {
            runtime_url: runtime_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// One HTTP round trip: send a template-wrapped sentence pair, take the
    /// top-ranked response entry. The caller reuses the returned prediction
    /// for both label and confidence.
    pub async fn invoke(
        &self,
        handle: &EndpointHandle,
        text: &str,
    ) -> Result<Prediction, PlatformError> {
        let url = format!(
            "{}/endpoints/{}/invocations",
            self.runtime_url, handle.endpoint_name
        );
        let raw: Vec<RawPrediction> = self
            .client
            .post(&url)
            .json(&InvokeRequest { inputs: text })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        top_prediction(raw)
    }
}
