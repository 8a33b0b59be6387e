//! In-memory rendering backend.
//!
//! Stores buffer contents in host memory and records draw calls instead of
//! executing them. Used when no graphics adapter is available and throughout the
//! tests, where the recorded bytes and draws are inspected directly.

use std::collections::HashMap;

use crate::engine_state::buffer_state::BufferAnalytics;

use super::{BackendError, BufferHandle, DrawCall, RenderBackend};

/// A [`RenderBackend`] that keeps everything in host memory.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    buffers: HashMap<BufferHandle, Vec<u8>>,
    buffer_analytics: HashMap<BufferHandle, BufferAnalytics>,
    next_handle: u64,
    draw_calls: Vec<DrawCall>,
    memory_budget: Option<u64>,
    failing_uploads: bool,
}

impl HeadlessBackend {
    /// An unbounded backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that refuses allocations once `bytes` are live.
    pub fn with_memory_budget(bytes: u64) -> Self {
        HeadlessBackend {
            memory_budget: Some(bytes),
            ..Default::default()
        }
    }

    /// Makes every following upload fail with [`BackendError::OutOfBounds`].
    pub fn set_failing_uploads(&mut self, failing: bool) {
        self.failing_uploads = failing;
    }

    /// Contents of a live buffer.
    pub fn buffer_bytes(&self, handle: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&handle).map(Vec::as_slice)
    }

    /// Analytics of a live buffer.
    pub fn analytics(&self, handle: BufferHandle) -> Option<BufferAnalytics> {
        self.buffer_analytics.get(&handle).copied()
    }

    /// Number of live buffers.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Bytes held by live buffers.
    pub fn allocated_bytes(&self) -> u64 {
        self.buffers.values().map(|b| b.len() as u64).sum()
    }

    /// Draws issued since the last frame began.
    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draw_calls
    }
}

impl RenderBackend for HeadlessBackend {
    fn allocate_buffer(&mut self, size_bytes: u64) -> Result<BufferHandle, BackendError> {
        if let Some(limit) = self.memory_budget {
            if self.allocated_bytes() + size_bytes > limit {
                return Err(BackendError::AllocationFailed {
                    requested: size_bytes,
                    limit,
                });
            }
        }

        let handle = BufferHandle(self.next_handle);
        self.next_handle += 1;
        self.buffers.insert(handle, vec![0; size_bytes as usize]);
        self.buffer_analytics
            .insert(handle, BufferAnalytics::new(size_bytes));
        Ok(handle)
    }

    fn upload(
        &mut self,
        handle: BufferHandle,
        bytes: &[u8],
        offset_bytes: u64,
    ) -> Result<(), BackendError> {
        let (Some(buffer), Some(buffer_analytics)) = (
            self.buffers.get_mut(&handle),
            self.buffer_analytics.get_mut(&handle),
        ) else {
            return Err(BackendError::UnknownBuffer(handle));
        };

        if self.failing_uploads {
            return Err(BackendError::OutOfBounds {
                offset: offset_bytes,
                len: bytes.len() as u64,
                capacity: 0,
            });
        }

        buffer_analytics.record_write(offset_bytes, bytes.len() as u64)?;
        let start = offset_bytes as usize;
        buffer[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn draw(&mut self, call: DrawCall) {
        self.draw_calls.push(call);
    }

    fn release(&mut self, handle: BufferHandle) {
        self.buffers.remove(&handle);
        self.buffer_analytics.remove(&handle);
    }

    fn begin_frame(&mut self) {
        self.draw_calls.clear();
    }
}
