use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Spinner-based progress over a fixed number of collection phases.
pub struct PhaseProgress {
    pb: ProgressBar,
    phase: usize,
    total: usize,
}

impl PhaseProgress {
    pub fn start(total: usize, message: impl std::fmt::Display) -> Self {
        let progress = Self {
            pb: Self::spinner(),
            phase: 1,
            total,
        };
        progress
            .pb
            .set_message(format!("Phase 1/{total}: {message}"));
        progress
    }

    /// Finish the current phase and begin the next one.
    pub fn next(self, done: impl std::fmt::Display, message: impl std::fmt::Display) -> Self {
        self.pb
            .finish_with_message(format!("✓ Phase {}/{}: {done}", self.phase, self.total));

        let phase = self.phase + 1;
        let pb = Self::spinner();
        pb.set_message(format!("Phase {phase}/{}: {message}", self.total));

        Self {
            pb,
            phase,
            total: self.total,
        }
    }

    pub fn finish(self, done: impl std::fmt::Display) {
        self.pb
            .finish_with_message(format!("✓ Phase {}/{}: {done}", self.phase, self.total));
    }

    fn spinner() -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .expect("static template is valid"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}
