use crate::catalog::MetricCatalog;
use crate::datamodel::MetricIdGenerator;
use crate::series::TimeSeries;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct HttpServerState {
    pub name: Arc<String>,
    pub catalog: MetricCatalog,
    pub series: Arc<TimeSeries>,
    pub ids: Arc<dyn MetricIdGenerator>,
}
