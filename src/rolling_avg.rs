use crate::circular_queue::CircularQueue;

/// Mean over the last `hcount` samples. The published value can be decayed
/// between samples; the next `push` replaces it with the window mean again.
#[derive(Debug, Clone)]
pub struct RollingAvg {
    current: f32,
    history: CircularQueue<f32>,
}

impl RollingAvg {
    pub fn new(hcount: usize) -> Self {
        Self {
            current: 0.0,
            history: CircularQueue::with_capacity(hcount),
        }
    }

    pub fn push(&mut self, sample: f32) -> f32 {
        self.history.push(sample);
        self.current = self.history.iter().sum::<f32>() / self.history.len() as f32;
        self.current
    }

    #[inline]
    pub fn decay(&mut self, factor: f32) {
        self.current *= factor;
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn num_samples(&self) -> usize {
        self.history.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.history.iter()
    }
}
