use std::collections::VecDeque;
use std::time::Instant;

const MAX_ROW_SAMPLES: usize = 64;

#[derive(Clone)]
pub struct TimingSample {
    pub row: u32,
    pub time_ms: f32,
}

/// CPU timing of a render, one sample per image row.
pub struct Profiler {
    frame_start: Option<Instant>,
    row_start: Option<(u32, Instant)>,

    // Timing history
    row_samples: VecDeque<TimingSample>,

    // Statistics
    pub avg_row_time_ms: f32,
    pub max_row_time_ms: f32,
    pub slowest_row: u32,
    pub frame_time_ms: f32,

    row_count: u32,
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Profiler {
    pub fn new() -> Self {
        Self {
            frame_start: None,
            row_start: None,
            row_samples: VecDeque::new(),
            avg_row_time_ms: 0.0,
            max_row_time_ms: 0.0,
            slowest_row: 0,
            frame_time_ms: 0.0,
            row_count: 0,
        }
    }

    fn elapsed_ms(start: Instant) -> f32 {
        (start.elapsed().as_secs_f64() * 1000.0) as f32
    }

    pub fn begin_frame(&mut self) {
        self.frame_start = Some(Instant::now());
        self.row_samples.clear();
        self.avg_row_time_ms = 0.0;
        self.max_row_time_ms = 0.0;
        self.slowest_row = 0;
        self.row_count = 0;
    }

    pub fn begin_row(&mut self, row: u32) {
        self.row_start = Some((row, Instant::now()));
    }

    pub fn end_row(&mut self) {
        let Some((row, start)) = self.row_start.take() else {
            return;
        };
        let sample = TimingSample {
            row,
            time_ms: Self::elapsed_ms(start),
        };

        // Running statistics cover every row, the history only the latest ones
        let n = self.row_count as f32;
        self.avg_row_time_ms = (self.avg_row_time_ms * n + sample.time_ms) / (n + 1.0);
        if sample.time_ms >= self.max_row_time_ms {
            self.max_row_time_ms = sample.time_ms;
            self.slowest_row = row;
        }
        self.row_count += 1;

        self.row_samples.push_back(sample);
        if self.row_samples.len() > MAX_ROW_SAMPLES {
            self.row_samples.pop_front();
        }
    }

    pub fn end_frame(&mut self) {
        if let Some(start) = self.frame_start.take() {
            self.frame_time_ms = Self::elapsed_ms(start);
        }
        log::info!(
            "Rendered {} rows in {:.1} ms (avg {:.2} ms/row, slowest row {} at {:.2} ms)",
            self.row_count,
            self.frame_time_ms,
            self.avg_row_time_ms,
            self.slowest_row,
            self.max_row_time_ms
        );
    }

    pub fn get_latest_sample(&self) -> Option<&TimingSample> {
        self.row_samples.back()
    }

    pub fn get_row_count(&self) -> u32 {
        self.row_count
    }
}
