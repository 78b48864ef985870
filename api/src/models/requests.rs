use serde::Deserialize;
use utoipa::IntoParams;

#[derive(IntoParams, Debug, Deserialize)]
#[into_params(style = Form, parameter_in = Query)]
pub struct LatestTelemetryQuery {
    /// Number of samples to return, most recent first.
    #[param(example = 20, minimum = 0)]
    pub n: Option<usize>,
}
