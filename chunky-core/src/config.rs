//! Engine settings, loaded from the user's preferences as TOML.

const DOCUMENTATION: &str = r#"# chunky-core engine settings. You may edit this file, but be aware that formatting and comments
# will not be preserved. Missing keys take their default values.

# Examples:
# [chunk_pool]
# max_retained_chunks = 256
# [history]
# max_undo_packets = 500

"#;

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkPoolConfig {
    /// How many freed pixel buffers to keep around, per resolution, for reuse by new chunks.
    pub max_retained_chunks: usize,
}
impl Default for ChunkPoolConfig {
    fn default() -> Self {
        Self {
            max_retained_chunks: 256,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of undo steps. Oldest steps are forgotten first. `None` for unlimited.
    pub max_undo_packets: Option<usize>,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    pub chunk_pool: ChunkPoolConfig,
    pub history: HistoryConfig,
}
impl EngineConfig {
    const FILENAME: &'static str = "engine.toml";

    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
    /// Where the settings live by default, if the platform has a preferences dir at all.
    #[must_use]
    pub fn default_path() -> Option<std::path::PathBuf> {
        let mut base_dir = dirs::preference_dir()?;
        base_dir.push(env!("CARGO_PKG_NAME"));
        base_dir.push(Self::FILENAME);
        Some(base_dir)
    }
    /// Read and parse the file at `path`, defaulting on any failure.
    #[must_use]
    pub fn load_or_default(path: &std::path::Path) -> Self {
        let read = || -> anyhow::Result<Self> {
            let string = std::fs::read_to_string(path)?;
            Self::from_toml_str(&string)
        };
        match read() {
            Ok(config) => config,
            Err(e) => {
                log::warn!(
                    "Engine settings at {} weren't available, defaulting: {e}",
                    path.display()
                );
                Self::default()
            }
        }
    }
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let mut string = toml::ser::to_string_pretty(self)?;
        string = DOCUMENTATION.to_owned() + &string;
        std::fs::write(path, string)?;
        Ok(())
    }
}
