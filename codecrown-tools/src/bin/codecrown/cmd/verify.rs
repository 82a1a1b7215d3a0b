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
        if manip.verify_security_sector()? {
            println!("{}", "Code Crown is valid.".green());
            Ok(0)
        } else {
            println!("{}", "Code Crown is not valid.".red());
            Ok(2)
        }
    }
}
