use crate::config::AutolabelConfig;

pub fn setup_logging(config: &AutolabelConfig) {
    common::setup_logging(config.environment.clone());
}
