/// Per-call evaluation input. Built fresh for every evaluation; nothing here
/// outlives the call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationContext {
    pub frame: i64,
    /// Seconds on the host timeline.
    pub time: f64,
    pub total_units: usize,
}

impl EvaluationContext {
    pub fn new(frame: i64, time: f64, total_units: usize) -> Self {
        Self {
            frame,
            time,
            total_units,
        }
    }

    /// Derives `time` from a frame number and the project frame rate.
    /// A non-positive frame rate maps every frame to time zero.
    pub fn from_frame(frame: i64, frame_rate: f64, total_units: usize) -> Self {
        let time = if frame_rate > 0.0 {
            frame as f64 / frame_rate
        } else {
            0.0
        };
        Self::new(frame, time, total_units)
    }

    pub fn with_total_units(self, total_units: usize) -> Self {
        Self {
            total_units,
            ..self
        }
    }
}
