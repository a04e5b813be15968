/*! Networked quality estimation

Sentence pairs are sent in batches to a remote scoring endpoint which returns a risk
(between 0 and 1) for each of them. A pair is kept when its risk is lower or equal to the threshold.

Request (POST, query parameters `sl`, `tl` and `token`):
```json
{"rows": [{"original": "Hello", "translation": "Hallo"}]}
```
Response, in request order:
```json
{"rows": [{"risk": 0.12}]}
```

Non-success responses and transport errors are retried according to a [RetryPolicy].
The HTTP layer sits behind [Connector]/[Session] so that it can be swapped out.
!*/
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::lang::LanguagePair;

use super::{estimator::QualityEstimator, retry::RetryPolicy};

pub const DEFAULT_ENDPOINT: &str = "https://api.modelfront.com/v1/predict";

#[derive(Debug, Serialize)]
pub struct Row<'a> {
    pub original: &'a str,
    pub translation: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ScoreRequest<'a> {
    pub rows: Vec<Row<'a>>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Score {
    pub risk: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScoreResponse {
    pub rows: Vec<Score>,
}

/// Outcome of a single request.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Scores(ScoreResponse),
    /// Transient failure (non-success status, connection error...), with a description.
    Failure(String),
}

/// Opens sessions to the scoring service.
pub trait Connector {
    type Session: Session;
    fn connect(&self) -> Result<Self::Session, Error>;
}

pub trait Session {
    /// Post one request. Errors returned here are not retried.
    fn post(&self, url: &Url, request: &ScoreRequest) -> Result<Reply, Error>;
}

/// Blocking [reqwest] connector.
#[derive(Debug, Clone, Default)]
pub struct HttpConnector {
    timeout: Option<Duration>,
    /// Ignore system proxy settings.
    no_proxy: bool,
}

impl HttpConnector {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Connector for HttpConnector {
    type Session = HttpSession;

    fn connect(&self) -> Result<HttpSession, Error> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if self.no_proxy {
            builder = builder.no_proxy();
        }
        Ok(HttpSession {
            client: builder.build()?,
        })
    }
}

pub struct HttpSession {
    client: reqwest::blocking::Client,
}

impl Session for HttpSession {
    fn post(&self, url: &Url, request: &ScoreRequest) -> Result<Reply, Error> {
        let response = match self.client.post(url.clone()).json(request).send() {
            Ok(r) => r,
            Err(e) => return Ok(Reply::Failure(e.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            return Ok(Reply::Failure(format!("status {}", status)));
        }

        Ok(Reply::Scores(response.json()?))
    }
}

/// Build the endpoint url with its query parameters.
fn request_url(endpoint: &str, pair: &LanguagePair, token: Option<&str>) -> Result<Url, Error> {
    let mut params = vec![("sl", pair.source()), ("tl", pair.target())];
    if let Some(token) = token {
        params.push(("token", token));
    }
    Url::parse_with_params(endpoint, &params)
        .map_err(|e| Error::InvalidConfig(format!("invalid endpoint {:?}: {}", endpoint, e)))
}

/// Quality estimator querying a remote scoring service.
///
/// Has to be acquired (see [super::Acquired]) before checking anything.
pub struct NetworkedEstimator<C: Connector = HttpConnector> {
    url: Url,
    threshold: f64,
    retry: RetryPolicy,
    connector: C,
    session: Option<C::Session>,
}

impl NetworkedEstimator<HttpConnector> {
    /// Create an estimator for `pair` on `endpoint` (see [DEFAULT_ENDPOINT]).
    ///
    /// `threshold` is a percentage: pairs with a risk above `threshold / 100` are discarded.
    pub fn with_endpoint(
        endpoint: &str,
        pair: &LanguagePair,
        threshold: u8,
        token: Option<&str>,
    ) -> Result<Self, Error> {
        if threshold > 100 {
            return Err(Error::InvalidConfig(format!(
                "threshold must be a percentage, got {}",
                threshold
            )));
        }
        Ok(Self {
            url: request_url(endpoint, pair, token)?,
            threshold: f64::from(threshold) / 100.0,
            retry: RetryPolicy::default(),
            connector: HttpConnector::default(),
            session: None,
        })
    }
}

impl<C: Connector> NetworkedEstimator<C> {
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Swap the connector. Any open session is dropped.
    pub fn connector<D: Connector>(self, connector: D) -> NetworkedEstimator<D> {
        NetworkedEstimator {
            url: self.url,
            threshold: self.threshold,
            retry: self.retry,
            connector,
            session: None,
        }
    }

    /// Threshold as a fraction.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }
}

impl<C: Connector> QualityEstimator for NetworkedEstimator<C> {
    fn check(&mut self, source: &str, target: &str) -> Result<bool, Error> {
        let decisions = self.check_batch(&[source.to_string()], &[target.to_string()])?;
        decisions
            .first()
            .copied()
            .ok_or_else(|| Error::QeResponse("empty response".to_string()))
    }

    fn check_batch(&mut self, sources: &[String], targets: &[String]) -> Result<Vec<bool>, Error> {
        let session = self.session.as_ref().ok_or(Error::SessionNotOpen)?;

        let request = ScoreRequest {
            rows: sources
                .iter()
                .zip(targets)
                .map(|(original, translation)| Row {
                    original,
                    translation,
                })
                .collect(),
        };
        if request.rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut attempts = 0;
        let response = loop {
            attempts += 1;
            match session.post(&self.url, &request)? {
                Reply::Scores(response) => break response,
                Reply::Failure(reason) => {
                    warn!("got response {}", reason);
                    if !self.retry.allows(attempts) {
                        return Err(Error::RetriesExhausted {
                            attempts,
                            last_failure: reason,
                        });
                    }
                    let delay = self.retry.delay_after(attempts);
                    warn!("waiting for {:?} to retry...", delay);
                    std::thread::sleep(delay);
                    warn!("trying again (attempt {})...", attempts + 1);
                }
            }
        };

        if response.rows.len() != request.rows.len() {
            return Err(Error::QeResponse(format!(
                "sent {} rows, got {} scores",
                request.rows.len(),
                response.rows.len()
            )));
        }

        debug!("scored {} rows in {} attempt(s)", response.rows.len(), attempts);
        Ok(response
            .rows
            .iter()
            .map(|score| score.risk <= self.threshold)
            .collect())
    }

    fn acquire(&mut self) -> Result<(), Error> {
        if self.session.is_none() {
            info!("opening quality estimation session");
            self.session = Some(self.connector.connect()?);
        }
        Ok(())
    }

    fn release(&mut self) {
        if self.session.take().is_some() {
            info!("quality estimation session closed");
        }
    }
}
