mod cmd;
mod util;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use crate::util::common_options::CardRegisters;
use crate::util::logging;

#[derive(clap::Parser)]
#[clap(
    name = "codecrown",
    about = "Digimon Xros Loader Code Crown tool",
    version
)]
struct Cli {
    /// Card identification register value as hex
    #[clap(short = 'i', long, global = true, help_heading = "CARD REGISTERS")]
    cid: Option<String>,
    /// Card specific data register value as hex
    #[clap(short = 's', long, global = true, help_heading = "CARD REGISTERS")]
    csd: Option<String>,
    /// Card SD status register value as hex
    #[clap(short = 'r', long, global = true, help_heading = "CARD REGISTERS")]
    ssr: Option<String>,

    #[clap(subcommand)]
    subcommand: Option<Subcommand>,
}

#[derive(clap::Subcommand)]
enum Subcommand {
    /// List available card devices
    List(cmd::list::Cmd),
    /// Create a Code Crown with a valid security sector
    Create(cmd::create::Cmd),
    /// Verify the Code Crown security sector
    Verify(cmd::verify::Cmd),
    /// Dump quest data from a Code Crown to a file
    Dump(cmd::dump::Cmd),
    /// Install a quest file onto a Code Crown
    Load(cmd::load::Cmd),
    /// Extract the quest file from a DCC Special Quest Downloader
    Extract(cmd::extract::Cmd),
}

impl Cli {
    /// The register values given on the command line: all three or none.
    fn card_registers(&self) -> Result<Option<CardRegisters>> {
        match (&self.cid, &self.csd, &self.ssr) {
            (None, None, None) => Ok(None),
            (Some(cid), Some(csd), Some(ssr)) => Ok(Some(CardRegisters {
                cid: cid.clone(),
                csd: csd.clone(),
                ssr: ssr.clone(),
            })),
            _ => anyhow::bail!(
                "CID, CSD, and SSR must all be specified when any of them is specified."
            ),
        }
    }
}

fn main() -> Result<()> {
    logging::setup();

    let cli = Cli::parse();
    let registers = cli.card_registers()?;

    let Some(subcommand) = cli.subcommand else {
        Cli::command().print_help()?;
        std::process::exit(1);
    };

    let exit_code = match subcommand {
        Subcommand::List(cmd) => cmd.run()?,
        Subcommand::Create(cmd) => cmd.run(registers.as_ref())?,
        Subcommand::Verify(cmd) => cmd.run(registers.as_ref())?,
        Subcommand::Dump(cmd) => cmd.run(registers.as_ref())?,
        Subcommand::Load(cmd) => cmd.run(registers.as_ref())?,
        Subcommand::Extract(cmd) => cmd.run()?,
    };
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::Cli;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn registers_are_all_or_nothing() {
        let cli = Cli::parse_from(["codecrown", "--cid", "00ff", "list"]);
        assert!(cli.card_registers().is_err());

        let cli = Cli::parse_from([
            "codecrown", "--cid", "00", "--csd", "11", "--ssr", "22", "list",
        ]);
        let regs = cli.card_registers().unwrap().unwrap();
        assert_eq!(regs.cid, "00");
        assert_eq!(regs.csd, "11");
        assert_eq!(regs.ssr, "22");
    }

    #[test]
    fn no_registers_is_accepted() {
        let cli = Cli::parse_from(["codecrown", "list"]);
        assert!(cli.card_registers().unwrap().is_none());
    }
}
