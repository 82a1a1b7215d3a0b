use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use crate::util::common_options::{open_manip, CardRegisters};

#[derive(clap::Parser)]
pub struct Cmd {
    /// Path to the card device
    device: String,
    /// Path to the quest file to install
    input: PathBuf,
}

impl Cmd {
    pub fn run(self, registers: Option<&CardRegisters>) -> anyhow::Result<i32> {
        let data = fs::read(&self.input)
            .with_context(|| format!("Cannot read {}", self.input.display()))?;
        if !codecrown::crown::is_valid_payload(&data) {
            eprintln!("File does not contain valid quest data.");
            return Ok(2);
        }

        let mut manip = open_manip(&self.device, registers, false)?;
        manip.upload_payload(&data)?;
        println!("Installed quest data from {}.", self.input.display());
        Ok(0)
    }
}
