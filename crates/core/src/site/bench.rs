use std::time::Instant;

use tracing::info;

/// Wall-clock timing of one pipeline stage, logged only when enabled.
pub struct Stage {
    name: &'static str,
    started: Option<Instant>,
}

impl Stage {
    pub fn start(enabled: bool, name: &'static str) -> Self {
        let started = enabled.then(|| {
            info!("{} started", name);
            Instant::now()
        });
        Self { name, started }
    }

    pub fn end(self) {
        if let Some(started) = self.started {
            info!(
                "{} finished in {:.3} seconds",
                self.name,
                started.elapsed().as_secs_f64()
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.started.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_stage_does_not_time() {
        let stage = Stage::start(false, "parse");
        assert!(!stage.is_enabled());
        stage.end();

        let stage = Stage::start(true, "parse");
        assert!(stage.is_enabled());
        stage.end();
    }
}
