use colored::Colorize;

use crate::util::common_options::{open_manip, CardRegisters};

#[derive(clap::Parser)]
pub struct Cmd {
    /// Path to the card device
    device: String,
}

impl Cmd {
    pub fn run(self, registers: Option<&CardRegisters>) -> anyhow::Result<i32> {
        let mut manip = open_manip(&self.device, registers, true)?;
        manip.create_security_sector()?;
        println!("{}", "Security sector written.".green());
        Ok(0)
    }
}
