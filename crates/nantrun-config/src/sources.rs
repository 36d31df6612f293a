use std::collections::BTreeMap;

use super::{Config, ConfigSource};

fn stable_source_label(source: Option<&ConfigSource>) -> &'static str {
    match source {
        Some(ConfigSource::Cli) => "cli",
        Some(ConfigSource::ConfigFile(_)) => "config",
        Some(ConfigSource::Defaults) | None => "default",
    }
}

impl Config {
    /// Effective job settings as `key -> (value, source)`.
    ///
    /// Unset settings are omitted. Sources are `cli`, `config` or `default`.
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, (String, String)> {
        let mut config = BTreeMap::new();

        let mut add = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                let source = stable_source_label(self.source_attribution.get(key));
                config.insert(key.to_string(), (value, source.to_string()));
            }
        };

        add("build_file", self.job.build_file.clone());
        add("installation", self.job.installation.clone());
        add("targets", self.job.targets.clone());
        add("properties", self.job.properties.clone());
        add(
            "working_dir",
            self.job.working_dir.as_ref().map(|p| p.display().to_string()),
        );
        add("platform", self.job.platform.map(|p| p.to_string()));

        config
    }
}
