use std::rc::Rc;
use std::time::{Duration, Instant};

use color_eyre::Result;
use tracing::info;

use crate::slurm::{Cluster, CommandRunner, Scheduler, SystemRunner};

#[derive(Debug)]
pub struct App<R = SystemRunner> {
    /// Is the application running?
    pub running: bool,
    /// Refresh frequency in seconds; zero disables automatic updates
    pub interval: u64,
    /// Slurm nodes and jobs organized by partition
    pub cluster: Rc<Cluster>,
    slurm: Scheduler<R>,
    /// Time since last automatic update
    last_update: Instant,
}

impl<R: CommandRunner> App<R> {
    /// Constructs a new instance of [`App`].
    pub fn new(slurm: Scheduler<R>, interval: u64) -> Result<Self> {
        let cluster = slurm.cluster()?;

        Ok(Self {
            running: true,
            interval,
            cluster: Rc::new(cluster),
            slurm,
            last_update: Instant::now(),
        })
    }

    /// Handles the tick event of the terminal.
    pub fn tick(&mut self) -> Result<bool> {
        if self.interval > 0 {
            self.update(self.interval)
        } else {
            Ok(false)
        }
    }

    /// Refreshes the Slurm state if at least `interval` seconds have passed
    pub fn update(&mut self, interval: u64) -> Result<bool> {
        // A minimum refresh rate is enforced to prevent the user just holding `r`
        let update_rate = Duration::from_secs(interval.max(1));
        if self.last_update.elapsed() >= update_rate {
            let cluster = self.slurm.cluster()?;
            if cluster.skipped > 0 {
                info!(skipped = cluster.skipped, "ignored malformed scheduler output");
            }

            self.cluster = Rc::new(cluster);
            self.last_update = Instant::now();

            return Ok(true);
        }

        Ok(false)
    }

    /// Set running to false to quit the application.
    pub fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slurm::command::fake::FakeRunner;
    use crate::slurm::Programs;

    #[test]
    fn test_refresh_rate_is_limited() {
        let runner = FakeRunner::default().with("sinfo", "cn01 p1 idle 1000 4 1 4 1 (null)\n");
        let mut app = App::new(Scheduler::with_runner(&runner, Programs::default()), 0).unwrap();

        assert_eq!(app.cluster.partitions.len(), 1);
        assert!(!app.tick().unwrap());
        assert!(!app.update(60).unwrap());
        assert_eq!(runner.calls().len(), 2);

        app.quit();
        assert!(!app.running);
    }
}
