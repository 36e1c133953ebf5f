//! Response helper extensions.

use salvo::{
    http::{StatusCode, header::LOCATION},
    prelude::{Response, StatusError},
};
use tracing::error;

pub(crate) trait ResponseExt {
    /// Mark the response `201 Created` with a `Location` of the new resource.
    fn created_at(&mut self, location: String) -> Result<(), StatusError>;
}

impl ResponseExt for Response {
    fn created_at(&mut self, location: String) -> Result<(), StatusError> {
        self.add_header(LOCATION, &location, true).map_err(|source| {
            error!(location, "failed to set location header: {source}");

            StatusError::internal_server_error()
        })?;

        self.status_code(StatusCode::CREATED);

        Ok(())
    }
}
