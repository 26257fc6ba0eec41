use tracing::warn;
use url::Url;

use crate::error::ConnectorError;

pub mod artifact;
pub mod contract;
pub mod message;
pub mod metadata;
pub mod negotiation;

/// Logs a failed save and reports it as a persistence error.
pub(crate) fn storage_failure(what: &str, id: &Url, err: ConnectorError) -> ConnectorError {
    warn!(
        subject = %id,
        error = %err,
        "could not save {what}, the download may be retried later"
    );
    if matches!(err, ConnectorError::Persistence(_)) {
        err
    } else {
        ConnectorError::Persistence(err.to_string())
    }
}
