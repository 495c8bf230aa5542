use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

/// One entry of `frameworks.json`.
#[derive(Deserialize, Debug)]
pub struct Framework {
    pub name: String,
    pub version: String,
    pub url: String,
}

impl Framework {
    pub fn file_name(&self) -> String {
        format!("{}-{}.css", self.name, self.version)
    }
}

pub fn read_manifest(path: &Path) -> Result<Vec<Framework>, Box<dyn std::error::Error>> {
    let bytes = fs::read(path)?;
    let frameworks: Vec<Framework> = serde_json::from_slice(&bytes)?;
    Ok(frameworks)
}

pub fn download_file(url: &str, dest_path: &Path) -> Result<u64, Box<dyn std::error::Error>> {
    tracing::info!(url, dest = %dest_path.display(), "downloading");
    let conf = ureq::Agent::config_builder().proxy(None).build();
    let agent = ureq::Agent::new_with_config(conf);
    let response = agent.get(url).call()?;

    if response.status() != 200 {
        return Err(format!("Failed to download {url}: HTTP {}", response.status()).into());
    }

    let mut reader = response.into_body().into_reader();
    let mut file = fs::File::create(dest_path)?;
    let written = io::copy(&mut reader, &mut file)?;

    tracing::debug!(bytes = written, "downloaded");
    Ok(written)
}
