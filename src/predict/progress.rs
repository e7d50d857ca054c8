use log::info;

const LOG_EVERY: usize = 10;

/// Track progress through the weight grid
pub struct SweepProgress {
    total: usize,
    evaluated: usize,
    best_accuracy: f64,
}

impl SweepProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            evaluated: 0,
            best_accuracy: 0.0,
        }
    }

    pub fn record(&mut self, accuracy: f64) {
        self.evaluated += 1;
        self.best_accuracy = self.best_accuracy.max(accuracy);
        self.log_progress();
    }

    pub fn evaluated(&self) -> usize {
        self.evaluated
    }

    fn log_progress(&self) {
        if should_log(self.evaluated, self.total) {
            info!(
                "  → Progress: {}/{} weight pairs (best so far {:.1}%)",
                self.evaluated, self.total, self.best_accuracy
            );
        }
    }
}

fn should_log(current: usize, total: usize) -> bool {
    is_milestone(current) || is_complete(current, total)
}

fn is_milestone(count: usize) -> bool {
    count % LOG_EVERY == 0
}

fn is_complete(current: usize, total: usize) -> bool {
    current == total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logs_on_milestones_and_completion() {
        assert!(should_log(10, 121));
        assert!(should_log(121, 121));
        assert!(!should_log(7, 121));
    }

    #[test]
    fn test_record_counts_pairs() {
        let mut progress = SweepProgress::new(4);
        progress.record(40.0);
        progress.record(65.0);

        assert_eq!(progress.evaluated(), 2);
        assert_eq!(progress.best_accuracy, 65.0);
    }
}
