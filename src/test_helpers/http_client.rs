use url::Url;

use crate::{config::AppConfig, transport::RestBackend};

/// Creates a REST backend pointed at `base_url`, typically a mockito server.
pub fn create_test_backend(base_url: &str) -> RestBackend {
    let url = Url::parse(base_url).unwrap();
    RestBackend::from_config(&AppConfig::default().with_backend_url(url)).unwrap()
}
