//! Bulk download: one request per qualifying item, fanned out concurrently,
//! results collected in request order.

use std::sync::Arc;
use tokio::task::JoinSet;

use crate::host::{DownloadHost, DownloadId, DownloadRequest, HostError};
use crate::model::{BundleInfo, Format};

/// Outcome of one request, paired with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    pub request: DownloadRequest,
    pub outcome: Result<DownloadId, HostError>,
}

/// Builds the requests for `format`: `<book>.<ext>`, or
/// `<bundle>/<book>.<ext>` when `nest_by_bundle` is set.
pub fn plan_requests(
    info: &BundleInfo,
    format: Format,
    nest_by_bundle: bool,
) -> Vec<DownloadRequest> {
    info.items_with(format)
        .filter_map(|item| {
            let url = item.url(format)?;
            let file = format!("{}.{}", item.book_name, format.extension());
            let filename = if nest_by_bundle {
                format!("{}/{}", info.sanitized_bundle_name, file)
            } else {
                file
            };
            Some(DownloadRequest {
                url: url.to_string(),
                filename,
            })
        })
        .collect()
}

/// Issues every request without waiting for earlier ones and returns the
/// results in the order the requests were given.
pub async fn fan_out<D: DownloadHost>(
    host: Arc<D>,
    requests: Vec<DownloadRequest>,
) -> Vec<DownloadResult> {
    let mut set = JoinSet::new();
    for (index, request) in requests.iter().cloned().enumerate() {
        let host = Arc::clone(&host);
        set.spawn_blocking(move || {
            let outcome = host.download(&request);
            (index, outcome)
        });
    }

    let mut slots: Vec<Option<Result<DownloadId, HostError>>> =
        (0..requests.len()).map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, outcome)) => {
                match &outcome {
                    Ok(id) => tracing::debug!(index, %id, "download started"),
                    Err(e) => tracing::warn!(index, "download failed: {}", e),
                }
                slots[index] = Some(outcome);
            }
            Err(e) => tracing::warn!("download task join: {}", e),
        }
    }

    requests
        .into_iter()
        .zip(slots)
        .map(|(request, slot)| DownloadResult {
            request,
            outcome: slot.unwrap_or_else(|| Err(HostError::new("download task did not complete"))),
        })
        .collect()
}

/// Aggregate of a finished batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub issued: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl Tally {
    pub fn from_results(results: &[DownloadResult]) -> Self {
        let failed = results.iter().filter(|r| r.outcome.is_err()).count();
        Self {
            issued: results.len(),
            succeeded: results.len() - failed,
            failed,
        }
    }

    /// "Initiated X / N downloads." with the failure count appended when nonzero.
    pub fn message(&self) -> String {
        if self.failed == 0 {
            format!("Initiated {} / {} downloads.", self.succeeded, self.issued)
        } else {
            format!(
                "Initiated {} / {} downloads, {} failed.",
                self.succeeded, self.issued, self.failed
            )
        }
    }
}

/// First failure in request order, formatted for the error line.
pub fn first_failure(results: &[DownloadResult]) -> Option<String> {
    results.iter().find_map(|r| match &r.outcome {
        Err(e) => Some(format!("Download failed for {}: {}", r.request.filename, e)),
        Ok(_) => None,
    })
}
