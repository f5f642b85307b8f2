use anyhow::Result;
use std::path::PathBuf;

pub fn run(path: PathBuf) -> Result<()> {
    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(path.join("data"))?;

    let config_path = path.join("polyslug.toml");
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    let config = r#"[database]
path = "./data/polyslug.db"

[locale]
default = "en"
available = ["en", "fr", "de"]

[slugs]
max_length = 100
separator = "-"
uniqueness = "global"
resolver = "sequential"
max_attempts = 100

[[models]]
name = "post"
translates = true
translated_fields = ["title", "slug"]
base_field = "title"
slug_field = "slug"
features = ["history"]
"#;

    std::fs::write(&config_path, config)?;

    tracing::info!("Created {:?}", config_path);
    tracing::info!("Run 'polyslug migrate' to set up the database");

    Ok(())
}
