// Roadmap endpoints
//
// Generation and account sync. Documents are passed through as JSON;
// callers validate the shape.

use serde::Serialize;
use tracing::debug;

use crate::client::RaastaClient;
use crate::error::Error;
use crate::models::GenerateRequest;

#[derive(Serialize)]
struct SaveBody<'a, T: ?Sized> {
    roadmap: &'a T,
}

impl RaastaClient {
    /// Generate a roadmap for the given questionnaire answers.
    ///
    /// `POST /generate`. On a non-success status the server's `error`
    /// field is carried in [`Error::Api`].
    pub async fn generate(&self, request: &GenerateRequest) -> Result<serde_json::Value, Error> {
        debug!(goal = %request.goal, lang = %request.lang, "requesting roadmap generation");
        self.post("generate", request).await
    }

    /// Save a roadmap to the signed-in account.
    ///
    /// `POST /save` with `{"roadmap": ...}`.
    pub async fn save<T: Serialize + Sync + ?Sized>(&self, roadmap: &T) -> Result<(), Error> {
        debug!("saving roadmap to account");
        self.post_no_response("save", Some(&SaveBody { roadmap }))
            .await
    }
}
