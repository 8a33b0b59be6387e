//! # Buffer State Module
//!
//! This module provides the wgpu implementation of [`RenderBackend`]. It owns every
//! vertex buffer the world allocates, checks writes against buffer bounds and keeps
//! per-buffer analytics.
//!
//! ## Architecture
//!
//! Buffers are referenced by [`BufferHandle`]s handed out at allocation time. Draw
//! calls are not recorded into a render pass here; they are collected per frame so
//! that whoever owns the surface and pipeline can replay them with
//! `set_vertex_buffer` / `draw` using [`PackedVertex::desc`] as the vertex layout.
//!
//! [`PackedVertex::desc`]: crate::engine_state::rendering::PackedVertex::desc

use std::collections::HashMap;

use log::{info, warn};
use wgpu::{Buffer, Device, Queue};

use crate::engine_state::rendering::{BackendError, BufferHandle, DrawCall, RenderBackend};

/// Analytics data for a vertex buffer
///
/// Tracks memory allocation, usage, and write operations for a buffer
/// to help identify optimization opportunities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferAnalytics {
    /// Total memory allocated for the buffer in bytes
    pub allocated_memory: u64,
    /// Highest byte written so far
    pub used_memory: u64,
    /// Number of times the buffer has been written to
    pub times_written: u64,
}

impl BufferAnalytics {
    /// Fresh analytics of a buffer of `allocated_memory` bytes.
    pub fn new(allocated_memory: u64) -> Self {
        BufferAnalytics {
            allocated_memory,
            ..Default::default()
        }
    }

    /// Validates a write of `len` bytes at `offset` and records it.
    pub fn record_write(&mut self, offset: u64, len: u64) -> Result<(), BackendError> {
        let end = offset.checked_add(len).filter(|&end| end <= self.allocated_memory);
        let Some(end) = end else {
            return Err(BackendError::OutOfBounds {
                offset,
                len,
                capacity: self.allocated_memory,
            });
        };
        self.used_memory = self.used_memory.max(end);
        self.times_written += 1;
        Ok(())
    }
}

/// Central manager for the GPU vertex buffers of the world
pub struct BufferState {
    /// The GPU device
    pub device: Device,
    /// The GPU command queue
    pub queue: Queue,
    /// Map of handles to buffer objects
    buffers: HashMap<BufferHandle, Buffer>,
    /// Analytics data for each buffer
    buffer_analytics: HashMap<BufferHandle, BufferAnalytics>,
    /// Handle given to the next allocation
    next_handle: u64,
    /// Draws issued since the last `begin_frame`
    draw_calls: Vec<DrawCall>,
}

impl BufferState {
    /// Creates a new buffer state manager
    ///
    /// # Arguments
    ///
    /// * `device` - The GPU device
    /// * `queue` - The GPU command queue
    pub fn new(device: Device, queue: Queue) -> Self {
        Self {
            device,
            queue,
            buffers: HashMap::new(),
            buffer_analytics: HashMap::new(),
            next_handle: 0,
            draw_calls: Vec::new(),
        }
    }

    /// Requests a device without a surface.
    ///
    /// # Returns
    ///
    /// `None` if no adapter or device is available on this machine.
    pub fn request_headless() -> Option<Self> {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::PRIMARY,
                flags: wgpu::InstanceFlags::empty(),
                backend_options: wgpu::BackendOptions::from_env_or_default(),
            });

            let adapter = match instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })
                .await
            {
                Ok(adapter) => adapter,
                Err(err) => {
                    warn!("No graphics adapter available: {}", err);
                    return None;
                }
            };
            info!("Using adapter {:?}", adapter.get_info());

            let (device, queue) = match adapter
                .request_device(&wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                    label: Some("voxel-streamer device"),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                    trace: wgpu::Trace::Off,
                })
                .await
            {
                Ok(pair) => pair,
                Err(err) => {
                    warn!("Could not create a graphics device: {}", err);
                    return None;
                }
            };

            Some(BufferState::new(device, queue))
        })
    }

    /// Gets a buffer by handle
    pub fn get_buffer(&self, handle: BufferHandle) -> Option<&Buffer> {
        self.buffers.get(&handle)
    }

    /// Analytics of one buffer
    pub fn analytics(&self, handle: BufferHandle) -> Option<BufferAnalytics> {
        self.buffer_analytics.get(&handle).copied()
    }

    /// Draws issued since the last frame began
    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draw_calls
    }

    /// Number of live buffers
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Gets the total allocated memory across all buffers
    pub fn get_total_allocated_memory(&self) -> u64 {
        self.buffer_analytics
            .values()
            .fold(0, |acc, buffer_analytics| acc + buffer_analytics.allocated_memory)
    }

    /// Gets the total used memory across all buffers
    pub fn get_total_used_memory(&self) -> u64 {
        self.buffer_analytics
            .values()
            .fold(0, |acc, buffer_analytics| acc + buffer_analytics.used_memory)
    }
}

impl RenderBackend for BufferState {
    fn allocate_buffer(&mut self, size_bytes: u64) -> Result<BufferHandle, BackendError> {
        let limit = self.device.limits().max_buffer_size;
        if size_bytes > limit {
            return Err(BackendError::AllocationFailed {
                requested: size_bytes,
                limit,
            });
        }

        let handle = BufferHandle(self.next_handle);
        self.next_handle += 1;

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Column Vertex Buffer"),
            size: size_bytes,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        self.buffers.insert(handle, buffer);
        self.buffer_analytics
            .insert(handle, BufferAnalytics::new(size_bytes));
        Ok(handle)
    }

    /// Writes raw byte data to a buffer
    ///
    /// Offsets and lengths must be multiples of `wgpu::COPY_BUFFER_ALIGNMENT`, which
    /// whole packed vertices always are.
    fn upload(
        &mut self,
        handle: BufferHandle,
        bytes: &[u8],
        offset_bytes: u64,
    ) -> Result<(), BackendError> {
        let (Some(buffer), Some(buffer_analytics)) = (
            self.buffers.get(&handle),
            self.buffer_analytics.get_mut(&handle),
        ) else {
            return Err(BackendError::UnknownBuffer(handle));
        };

        buffer_analytics.record_write(offset_bytes, bytes.len() as u64)?;
        if !bytes.is_empty() {
            self.queue.write_buffer(buffer, offset_bytes, bytes);
        }
        Ok(())
    }

    fn draw(&mut self, call: DrawCall) {
        self.draw_calls.push(call);
    }

    fn release(&mut self, handle: BufferHandle) {
        if let Some(buffer) = self.buffers.remove(&handle) {
            buffer.destroy();
        }
        self.buffer_analytics.remove(&handle);
    }

    fn begin_frame(&mut self) {
        self.draw_calls.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analytics_track_highest_write() {
        let mut analytics = BufferAnalytics::new(64);
        analytics.record_write(16, 16).unwrap();
        analytics.record_write(0, 8).unwrap();
        assert_eq!(analytics.used_memory, 32);
        assert_eq!(analytics.times_written, 2);
    }

    #[test]
    fn analytics_reject_writes_past_the_end() {
        let mut analytics = BufferAnalytics::new(64);
        assert_eq!(
            analytics.record_write(60, 8),
            Err(BackendError::OutOfBounds {
                offset: 60,
                len: 8,
                capacity: 64
            })
        );
        assert!(analytics.record_write(u64::MAX, 1).is_err());
        assert_eq!(analytics.times_written, 0);
    }
}
