use serde::{Deserialize, Serialize};

/// `from`/`to` local dates (`YYYY-MM-DD`) for history queries.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RangeParams {
    pub from: Option<String>,
    pub to: Option<String>,
}
