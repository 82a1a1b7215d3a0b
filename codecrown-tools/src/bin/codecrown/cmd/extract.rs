use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::Context;

#[derive(clap::Parser)]
pub struct Cmd {
    /// Path to the DCC Special Quest Downloader executable
    exe: PathBuf,
    /// Path to extract the quest file to
    #[clap(default_value = "quest.bin")]
    output: PathBuf,
}

impl Cmd {
    pub fn run(self) -> anyhow::Result<i32> {
        let file =
            File::open(&self.exe).with_context(|| format!("Cannot open {}", self.exe.display()))?;

        match codecrown::extract::extract(file)? {
            Some(data) => {
                fs::write(&self.output, &data)?;
                println!("Extracted quest data to {}.", self.output.display());
                Ok(0)
            }
            None => {
                eprintln!("DCC Special Quest Downloader not recognized.");
                Ok(2)
            }
        }
    }
}
