use codecrown::device::list::DiskLister;

#[derive(clap::Parser)]
pub struct Cmd {}

impl Cmd {
    pub fn run(self) -> anyhow::Result<i32> {
        let lister = DiskLister::new()?;
        let volumes = lister.volumes()?;

        if volumes.is_empty() {
            println!("No card devices were found.");
        } else {
            for volume in volumes {
                println!("{volume}");
            }
        }
        Ok(0)
    }
}
