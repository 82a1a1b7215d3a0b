use std::fs;
use std::path::PathBuf;

use crate::util::common_options::{open_manip, CardRegisters};

#[derive(clap::Parser)]
pub struct Cmd {
    /// Path to the card device
    device: String,
    /// Path to write the quest data to
    #[clap(default_value = "quest.bin")]
    output: PathBuf,
}

impl Cmd {
    pub fn run(self, registers: Option<&CardRegisters>) -> anyhow::Result<i32> {
        let mut manip = open_manip(&self.device, registers, false)?;
        let dump = manip.dump_payload()?;

        if !codecrown::crown::is_valid_payload(&dump) {
            eprintln!("Card does not contain valid quest data.");
            return Ok(2);
        }

        fs::write(&self.output, &dump)?;
        println!("Dumped quest data to {}.", self.output.display());
        Ok(0)
    }
}
