pub mod validated_json;

use serde::Serialize;
use utoipa::ToSchema;

pub use validated_json::{ValidatedJson, ValidatedJsonRejection};

/// Error body shared by every endpoint
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({"error": "Unauthorized"}))]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
