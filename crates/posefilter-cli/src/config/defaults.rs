use posefilter::core::io::container::ContainerFormat;
use posefilter::engine::config::DEFAULT_RMSD_THRESHOLD;

pub struct DefaultsConfig {
    pub rmsd_threshold: f64,
    pub container: ContainerFormat,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            rmsd_threshold: DEFAULT_RMSD_THRESHOLD,
            container: ContainerFormat::default(),
        }
    }
}
