use std::sync::Mutex;

use crate::complex::Complex;

/// Bounded free-list of component buffers shared across requests.
///
/// Encoders take a buffer, the orchestrator returns it once a request no
/// longer needs the vector. Buffers beyond `capacity` are dropped.
#[derive(Debug)]
pub struct BufferPool {
    free: Mutex<Vec<Vec<Complex>>>,
    capacity: usize,
}

impl BufferPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// A zeroed buffer of length `dimension`.
    pub fn take(&self, dimension: usize) -> Vec<Complex> {
        let reused = self
            .free
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop();
        match reused {
            Some(mut buf) => {
                buf.clear();
                buf.resize(dimension, Complex::ZERO);
                buf
            }
            None => vec![Complex::ZERO; dimension],
        }
    }

    pub fn recycle(&self, buf: Vec<Complex>) {
        let mut free = self.free.lock().unwrap_or_else(|e| e.into_inner());
        if free.len() < self.capacity {
            free.push(buf);
        }
    }

    pub fn available(&self) -> usize {
        self.free.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
