/// Equally spaced sample points `x_i = start + (end - start) * i / size`
/// over the half-open interval `[start, end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    pub start: f64,
    pub end: f64,
    pub size: usize,
}

impl Default for Domain {
    fn default() -> Self {
        Self {
            start: -5.0,
            end: 5.0,
            size: 8192,
        }
    }
}

impl Domain {
    pub fn new(start: f64, end: f64, size: usize) -> Self {
        Self { start, end, size }
    }

    pub fn samples(&self) -> Vec<f64> {
        let width = self.end - self.start;
        (0..self.size)
            .map(|i| self.start + width * i as f64 / self.size as f64)
            .collect()
    }
}
